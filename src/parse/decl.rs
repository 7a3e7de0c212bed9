use super::*;
use crate::ast::{
    AclDeclaration, AclEntry, BackendDeclaration, BackendProperty, BackendValue, Declaration,
    DirectorBackend, DirectorDeclaration, DirectorProperty, DirectorPropertyEntry,
    PenaltyboxDeclaration, RatecounterDeclaration, SubroutineDeclaration, TableDeclaration,
    TableEntry,
};

impl Parser {
    pub(crate) fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TK::Acl => self.parse_acl(),
            TK::Backend => self.parse_backend(),
            TK::Director => self.parse_director(),
            TK::Table => self.parse_table(),
            TK::Sub => self.parse_subroutine(),
            TK::Penaltybox => self.parse_penaltybox(),
            TK::Ratecounter => self.parse_ratecounter(),
            _ => Err(ParseError::UnexpectedToken(token)),
        }
    }

    /// `acl NAME { (!?"ip"(/N)?;)* }`
    fn parse_acl(&mut self) -> Result<Declaration, ParseError> {
        let meta = self.open();
        self.advance();
        let name = self.parse_ident()?;
        self.consume(TK::LeftBrace)?;
        self.nest += 1;

        let mut decl = AclDeclaration {
            meta,
            name,
            entries: Vec::new(),
        };

        while !matches!(self.current_kind(), TK::RightBrace | TK::Eof) {
            decl.entries.push(self.parse_acl_entry()?);
        }

        decl.meta.infix = self.take_infix();
        self.nest -= 1;
        self.consume(TK::RightBrace)?;
        self.close(&mut decl.meta);
        Ok(Declaration::Acl(decl))
    }

    fn parse_acl_entry(&mut self) -> Result<AclEntry, ParseError> {
        let meta = self.open();
        let inverse = if self.current_kind() == TK::Not {
            self.advance();
            true
        } else {
            false
        };
        let ip = self.parse_string()?;
        let mask = if self.current_kind() == TK::Slash {
            self.advance();
            Some(self.parse_integer()?)
        } else {
            None
        };
        self.consume(TK::Semicolon)?;
        let mut entry = AclEntry {
            meta,
            ip,
            mask,
            inverse,
        };
        self.close(&mut entry.meta);
        Ok(entry)
    }

    /// `backend NAME { .KEY = EXPR; … .probe = { .KEY = EXPR; … } }`
    fn parse_backend(&mut self) -> Result<Declaration, ParseError> {
        let meta = self.open();
        self.advance();
        let name = self.parse_ident()?;
        self.consume(TK::LeftBrace)?;
        self.nest += 1;

        let mut decl = BackendDeclaration {
            meta,
            name,
            properties: Vec::new(),
        };
        while !matches!(self.current_kind(), TK::RightBrace | TK::Eof) {
            decl.properties.push(self.parse_backend_property()?);
        }

        decl.meta.infix = self.take_infix();
        self.nest -= 1;
        self.consume(TK::RightBrace)?;
        self.close(&mut decl.meta);
        Ok(Declaration::Backend(decl))
    }

    fn parse_backend_property(&mut self) -> Result<BackendProperty, ParseError> {
        let meta = self.open();
        let key = self.parse_property_key()?;
        self.consume(TK::Assign)?;

        let value = if self.current_kind() == TK::LeftBrace {
            // Nested object, e.g. `.probe = { ... }`.
            self.consume(TK::LeftBrace)?;
            self.nest += 1;
            let mut inner = Vec::new();
            while !matches!(self.current_kind(), TK::RightBrace | TK::Eof) {
                inner.push(self.parse_backend_property()?);
            }
            self.nest -= 1;
            self.consume(TK::RightBrace)?;
            BackendValue::Object(inner)
        } else {
            let expr = self.parse_expression(Precedence::Lowest)?;
            self.consume(TK::Semicolon)?;
            BackendValue::Expression(expr)
        };

        let mut prop = BackendProperty { meta, key, value };
        self.close(&mut prop.meta);
        Ok(prop)
    }

    // Property keys are written `.name`; the leading dot is stripped from the
    // stored value and stays available on the token literal.
    fn parse_property_key(&mut self) -> Result<crate::ast::Ident, ParseError> {
        let mut ident = self.parse_ident()?;
        if let Some(stripped) = ident.value.strip_prefix('.') {
            ident.value = stripped.to_string();
            Ok(ident)
        } else {
            Err(ParseError::UnexpectedToken(ident.meta.token))
        }
    }

    /// `director NAME TYPE { .KEY = EXPR; … { .KEY = EXPR; … } … }`
    ///
    /// Plain properties and brace-delimited backend objects interleave in a
    /// single list, preserving source order.
    fn parse_director(&mut self) -> Result<Declaration, ParseError> {
        let meta = self.open();
        self.advance();
        let name = self.parse_ident()?;
        let director_type = self.parse_ident()?;
        self.consume(TK::LeftBrace)?;
        self.nest += 1;

        let mut decl = DirectorDeclaration {
            meta,
            name,
            director_type,
            properties: Vec::new(),
        };

        loop {
            match self.current_kind() {
                TK::RightBrace | TK::Eof => break,
                TK::LeftBrace => {
                    let backend_meta = self.open();
                    self.consume(TK::LeftBrace)?;
                    self.nest += 1;
                    let mut properties = Vec::new();
                    while !matches!(self.current_kind(), TK::RightBrace | TK::Eof) {
                        properties.push(self.parse_director_property()?);
                    }
                    self.nest -= 1;
                    self.consume(TK::RightBrace)?;
                    let mut backend = DirectorBackend {
                        meta: backend_meta,
                        properties,
                    };
                    self.close(&mut backend.meta);
                    decl.properties.push(DirectorProperty::Backend(backend));
                }
                _ => {
                    let entry = self.parse_director_property()?;
                    decl.properties.push(DirectorProperty::Property(entry));
                }
            }
        }

        decl.meta.infix = self.take_infix();
        self.nest -= 1;
        self.consume(TK::RightBrace)?;
        self.close(&mut decl.meta);
        Ok(Declaration::Director(decl))
    }

    fn parse_director_property(&mut self) -> Result<DirectorPropertyEntry, ParseError> {
        let meta = self.open();
        let key = self.parse_property_key()?;
        self.consume(TK::Assign)?;
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume(TK::Semicolon)?;
        let mut entry = DirectorPropertyEntry { meta, key, value };
        self.close(&mut entry.meta);
        Ok(entry)
    }

    /// `table NAME (TYPE)? { "k": EXPR, … }` with trailing comma allowed; the
    /// value type defaults to string when omitted.
    fn parse_table(&mut self) -> Result<Declaration, ParseError> {
        let meta = self.open();
        self.advance();
        let name = self.parse_ident()?;
        let value_type = if self.current_kind() == TK::Ident {
            Some(self.parse_ident()?)
        } else {
            None
        };
        self.consume(TK::LeftBrace)?;
        self.nest += 1;

        let mut decl = TableDeclaration {
            meta,
            name,
            value_type,
            entries: Vec::new(),
        };

        while !matches!(self.current_kind(), TK::RightBrace | TK::Eof) {
            let entry_meta = self.open();
            let key = self.parse_string()?;
            self.consume(TK::Colon)?;
            let value = self.parse_expression(Precedence::Lowest)?;
            if self.current_kind() == TK::Comma {
                self.advance();
            }
            let mut entry = TableEntry {
                meta: entry_meta,
                key,
                value,
            };
            self.close(&mut entry.meta);
            decl.entries.push(entry);
        }

        decl.meta.infix = self.take_infix();
        self.nest -= 1;
        self.consume(TK::RightBrace)?;
        self.close(&mut decl.meta);
        Ok(Declaration::Table(decl))
    }

    /// `sub NAME (TYPE)? { … }`; a type token after the name makes this a
    /// functional subroutine.
    fn parse_subroutine(&mut self) -> Result<Declaration, ParseError> {
        let meta = self.open();
        self.advance();
        let name = self.parse_ident()?;
        let return_type = if self.current_kind() == TK::Ident {
            Some(self.parse_ident()?)
        } else {
            None
        };
        let block = self.parse_block()?;
        let mut decl = SubroutineDeclaration {
            meta,
            name,
            return_type,
            block,
        };
        self.close(&mut decl.meta);
        Ok(Declaration::Subroutine(decl))
    }

    fn parse_penaltybox(&mut self) -> Result<Declaration, ParseError> {
        let meta = self.open();
        self.advance();
        let name = self.parse_ident()?;
        let block = self.parse_block()?;
        let mut decl = PenaltyboxDeclaration { meta, name, block };
        self.close(&mut decl.meta);
        Ok(Declaration::Penaltybox(decl))
    }

    fn parse_ratecounter(&mut self) -> Result<Declaration, ParseError> {
        let meta = self.open();
        self.advance();
        let name = self.parse_ident()?;
        let block = self.parse_block()?;
        let mut decl = RatecounterDeclaration { meta, name, block };
        self.close(&mut decl.meta);
        Ok(Declaration::Ratecounter(decl))
    }
}
