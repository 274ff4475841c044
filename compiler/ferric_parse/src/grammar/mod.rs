//! Grammar productions, one file per syntactic category.

mod expr;
mod item;
mod stmt;
mod ty;
