//! Assembly text buffers and the string literal pool.

use rustc_hash::FxHashMap;

/// Line-oriented assembly output.
#[derive(Debug, Default)]
pub(crate) struct Emitter {
    output: String,
}

impl Emitter {
    pub(crate) fn new() -> Self {
        Emitter {
            output: String::with_capacity(4096),
        }
    }

    /// An indented instruction or data directive.
    pub(crate) fn insn(&mut self, text: impl AsRef<str>) {
        self.output.push_str("    ");
        self.output.push_str(text.as_ref());
        self.output.push('\n');
    }

    pub(crate) fn label(&mut self, name: impl AsRef<str>) {
        self.output.push_str(name.as_ref());
        self.output.push_str(":\n");
    }

    /// A section or symbol directive at column zero.
    pub(crate) fn directive(&mut self, text: impl AsRef<str>) {
        self.output.push_str(text.as_ref());
        self.output.push('\n');
    }

    pub(crate) fn finish(self) -> String {
        self.output
    }
}

/// Interned string literals, labelled `.LC_str<N>` in first-use order.
#[derive(Debug, Default)]
pub(crate) struct StringPool {
    labels: FxHashMap<String, usize>,
    values: Vec<String>,
}

impl StringPool {
    /// Label of `value`, interning it on first use.
    pub(crate) fn label(&mut self, value: &str) -> String {
        let index = match self.labels.get(value) {
            Some(&index) => index,
            None => {
                let index = self.values.len();
                self.labels.insert(value.to_string(), index);
                self.values.push(value.to_string());
                index
            }
        };
        format!(".LC_str{index}")
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Emit the `.rodata` section, if any string was interned.
    pub(crate) fn emit(&self, out: &mut Emitter) {
        if self.is_empty() {
            return;
        }
        out.directive(".section .rodata");
        for (index, value) in self.values.iter().enumerate() {
            out.label(format!(".LC_str{index}"));
            out.insn(format!(".string \"{}\"", escape(value)));
        }
    }
}

/// Escape a string for a `.string` directive. Bytes outside printable ASCII
/// become three-digit octal escapes.
pub(crate) fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a \"b\"\\\n\t"), "a \\\"b\\\"\\\\\\n\\t");
        assert_eq!(escape("\0\u{7f}é"), "\\000\\177\\303\\251");
    }

    #[test]
    fn test_pool_reuses_labels() {
        let mut pool = StringPool::default();
        assert_eq!(pool.label("hi"), ".LC_str0");
        assert_eq!(pool.label("there"), ".LC_str1");
        assert_eq!(pool.label("hi"), ".LC_str0");

        let mut out = Emitter::new();
        pool.emit(&mut out);
        assert_eq!(
            out.finish(),
            ".section .rodata\n.LC_str0:\n    .string \"hi\"\n.LC_str1:\n    .string \"there\"\n"
        );
    }
}
