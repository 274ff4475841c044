//! Type annotations: `i64`, `String`, `Name`, `[Type; N]`.

use ferric_ir::DeclType;

use crate::{ParseError, Parser, Token};

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> Result<DeclType, ParseError> {
        if self.cursor.eat(&Token::LBracket) {
            let elem = self.parse_type()?;
            self.cursor.expect(&Token::Semicolon)?;
            let len = self.cursor.expect_int()?;
            let len = usize::try_from(len).map_err(|_| ParseError::InvalidToken {
                text: len.to_string(),
            })?;
            self.cursor.expect(&Token::RBracket)?;
            return Ok(DeclType::array(elem, len));
        }
        let name = self.cursor.expect_ident()?;
        Ok(DeclType::from_name(&name))
    }
}
