//! Struct memory layout.
//!
//! Fields are laid out in declaration order with no padding: every scalar is
//! one 8-byte word, arrays are `len * size(elem)`, nested structs take their
//! full size. A struct may only contain structs declared before it, so sizes
//! are always known when a layout is built.
//!
//! ```text
//! struct Line { from: Point, to: Point, tag: [i64;2] }
//!
//!  0        16       32          48
//!  | from   | to     | tag       |
//!  | x | y  | x | y  | [0] | [1] |
//! ```

use ferric_ir::{DeclType, StructDecl, WORD_SIZE};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::TypeError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: String,
    pub ty: DeclType,
    /// Byte offset from the start of the struct.
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructLayout {
    pub name: String,
    pub fields: Vec<FieldLayout>,
    /// Sum of all field sizes.
    pub size: usize,
}

impl StructLayout {
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Layouts of every struct in a module, keyed by struct name.
#[derive(Clone, Debug, Default)]
pub struct StructLayouts {
    layouts: FxHashMap<String, StructLayout>,
}

impl StructLayouts {
    pub fn get(&self, name: &str) -> Option<&StructLayout> {
        self.layouts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    /// Size in bytes of a value of type `ty`, `None` for unknown structs.
    pub fn size_of(&self, ty: &DeclType) -> Option<usize> {
        match ty {
            DeclType::I64 | DeclType::Str => Some(WORD_SIZE),
            DeclType::Void => Some(0),
            DeclType::Struct(name) => self.get(name).map(|layout| layout.size),
            DeclType::Array(elem, len) => Some(self.size_of(elem)? * len),
        }
    }

    /// Check that `ty` only names primitive types and already laid-out
    /// structs. `later` holds structs declared after the current point.
    pub(crate) fn validate(
        &self,
        ty: &DeclType,
        user: &str,
        later: &FxHashSet<&str>,
    ) -> Result<(), TypeError> {
        match ty {
            DeclType::I64 | DeclType::Str | DeclType::Void => Ok(()),
            DeclType::Array(elem, _) => {
                if **elem == DeclType::Void {
                    return Err(TypeError::VoidNotAllowed {
                        context: "an array element type".into(),
                    });
                }
                self.validate(elem, user, later)
            }
            DeclType::Struct(name) if self.contains(name) => Ok(()),
            DeclType::Struct(name) if later.contains(name.as_str()) => {
                Err(TypeError::StructNotYetDeclared {
                    name: name.clone(),
                    user: user.to_string(),
                })
            }
            DeclType::Struct(name) => Err(TypeError::UnknownType { name: name.clone() }),
        }
    }

    /// Lay out one struct declaration.
    pub(crate) fn add_struct(
        &mut self,
        decl: &StructDecl,
        later: &FxHashSet<&str>,
    ) -> Result<(), TypeError> {
        if self.contains(&decl.name) {
            return Err(TypeError::DuplicateStruct {
                name: decl.name.clone(),
            });
        }

        // A struct naming itself has not been laid out yet.
        let mut pending = later.clone();
        pending.insert(decl.name.as_str());

        let mut fields: Vec<FieldLayout> = Vec::with_capacity(decl.fields.len());
        let mut offset = 0;
        for field in &decl.fields {
            if fields.iter().any(|f| f.name == field.name) {
                return Err(TypeError::DuplicateField {
                    struct_name: decl.name.clone(),
                    field: field.name.clone(),
                });
            }
            if field.ty == DeclType::Void {
                return Err(TypeError::VoidNotAllowed {
                    context: format!("the type of field `{}.{}`", decl.name, field.name),
                });
            }
            self.validate(&field.ty, &decl.name, &pending)?;

            let size = self.size_of(&field.ty).ok_or_else(|| TypeError::UnknownType {
                name: field.ty.to_string(),
            })?;
            fields.push(FieldLayout {
                name: field.name.clone(),
                ty: field.ty.clone(),
                offset,
            });
            offset += size;
        }

        tracing::trace!(name = %decl.name, size = offset, "struct layout");
        self.layouts.insert(
            decl.name.clone(),
            StructLayout {
                name: decl.name.clone(),
                fields,
                size: offset,
            },
        );
        Ok(())
    }
}
