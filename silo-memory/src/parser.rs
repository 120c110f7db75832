use crate::{
    coerce,
    lexer::{tokenize, Token},
    store::ColumnMeta,
};
use silo_core::{DriverError, Error, Result, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetOpKind {
    Union,
    UnionAll,
    Except,
    Intersect,
}

#[derive(Debug)]
pub(crate) enum ConflictAction {
    Nothing,
    Update(Vec<(String, Expr)>),
}

#[derive(Debug)]
pub(crate) struct OnConflict {
    pub keys: Vec<String>,
    pub action: ConflictAction,
}

#[derive(Debug)]
pub(crate) struct SimpleSelect {
    pub distinct: bool,
    pub items: Vec<SelectItem>,
    pub table: String,
    pub filter: Option<Expr>,
}

#[derive(Debug)]
pub(crate) enum SelectItem {
    Star,
    Expr { expr: Expr, alias: Option<String> },
}

#[derive(Debug)]
pub(crate) enum SelectBody {
    Simple(SimpleSelect),
    Nested(Box<SelectQuery>),
    Compound {
        op: SetOpKind,
        left: Box<SelectBody>,
        right: Box<SelectBody>,
    },
}

#[derive(Debug)]
pub(crate) struct SelectQuery {
    pub body: SelectBody,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug)]
pub(crate) struct OrderItem {
    pub key: String,
    pub asc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    And,
    Or,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Add,
    Sub,
    Mul,
    Div,
    Concat,
}

#[derive(Debug)]
pub(crate) enum Expr {
    Column {
        table: Option<String>,
        name: String,
    },
    /// `excluded.column` inside an upsert's DO UPDATE SET.
    Excluded(String),
    Literal(Value),
    Placeholder(usize),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    InList {
        target: Box<Expr>,
        values: Vec<Expr>,
    },
    Between {
        target: Box<Expr>,
        lower: Box<Expr>,
        upper: Box<Expr>,
    },
    Like {
        target: Box<Expr>,
        pattern: Box<Expr>,
        escape: Option<char>,
        negate: bool,
    },
    IsNull {
        target: Box<Expr>,
        negate: bool,
    },
}

#[derive(Debug)]
pub(crate) enum Command {
    CreateTable {
        name: String,
        if_not_exists: bool,
        columns: Vec<ColumnMeta>,
        primary_key: Vec<String>,
    },
    DropTable {
        name: String,
        if_exists: bool,
    },
    CreateSequence {
        name: String,
        if_not_exists: bool,
        start_with: i64,
        increment_by: i64,
    },
    DropSequence {
        name: String,
        if_exists: bool,
    },
    Insert {
        table: String,
        columns: Vec<String>,
        rows: Vec<Vec<Expr>>,
        on_conflict: Option<OnConflict>,
    },
    Update {
        table: String,
        assignments: Vec<(String, Expr)>,
        filter: Option<Expr>,
    },
    Delete {
        table: String,
        filter: Option<Expr>,
    },
    Select(SelectQuery),
    SequenceNext {
        name: String,
    },
    Begin,
    Commit,
    Rollback,
}

fn syntax_error(message: impl Into<String>) -> Error {
    Error::new(DriverError::message(message.into()))
}

pub(crate) fn parse_command(sql: &str) -> Result<Command> {
    let mut parser = Parser {
        tokens: tokenize(sql)?,
        pos: 0,
    };
    let command = parser.parse()?;
    parser.eat_symbol(";");
    if parser.pos < parser.tokens.len() {
        return Err(syntax_error(format!(
            "trailing input after statement in `{sql}`"
        )));
    }
    Ok(command)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Result<&Token> {
        let token = self
            .tokens
            .get(self.pos)
            .ok_or_else(|| syntax_error("unexpected end of statement"))?;
        self.pos += 1;
        Ok(token)
    }

    fn eat_word(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_word(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_symbol(symbol)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, keyword: &str) -> Result<()> {
        if self.eat_word(keyword) {
            Ok(())
        } else {
            Err(syntax_error(format!(
                "expected `{keyword}`, found {:?}",
                self.peek()
            )))
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<()> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(syntax_error(format!(
                "expected `{symbol}`, found {:?}",
                self.peek()
            )))
        }
    }

    fn identifier(&mut self) -> Result<String> {
        match self.next()? {
            Token::Word(w) => Ok(w.clone()),
            Token::Quoted(q) => Ok(q.clone()),
            other => Err(syntax_error(format!("expected identifier, found {other:?}"))),
        }
    }

    fn integer(&mut self) -> Result<i64> {
        let negative = self.eat_symbol("-");
        match self.next()? {
            Token::Number(n) => {
                let value: i64 = n
                    .parse()
                    .map_err(|_| syntax_error(format!("not an integer: `{n}`")))?;
                Ok(if negative { -value } else { value })
            }
            other => Err(syntax_error(format!("expected integer, found {other:?}"))),
        }
    }

    fn parse(&mut self) -> Result<Command> {
        let first = self
            .peek()
            .ok_or_else(|| syntax_error("empty statement"))?
            .clone();
        match &first {
            Token::Word(w) if w.eq_ignore_ascii_case("CREATE") => self.parse_create(),
            Token::Word(w) if w.eq_ignore_ascii_case("DROP") => self.parse_drop(),
            Token::Word(w) if w.eq_ignore_ascii_case("INSERT") => self.parse_insert(),
            Token::Word(w) if w.eq_ignore_ascii_case("UPDATE") => self.parse_update(),
            Token::Word(w) if w.eq_ignore_ascii_case("DELETE") => self.parse_delete(),
            Token::Word(w) if w.eq_ignore_ascii_case("BEGIN") => {
                self.pos += 1;
                self.eat_word("TRANSACTION");
                Ok(Command::Begin)
            }
            Token::Word(w) if w.eq_ignore_ascii_case("START") => {
                self.pos += 1;
                self.expect_word("TRANSACTION")?;
                Ok(Command::Begin)
            }
            Token::Word(w) if w.eq_ignore_ascii_case("COMMIT") => {
                self.pos += 1;
                Ok(Command::Commit)
            }
            Token::Word(w) if w.eq_ignore_ascii_case("ROLLBACK") => {
                self.pos += 1;
                Ok(Command::Rollback)
            }
            Token::Word(w) if w.eq_ignore_ascii_case("SELECT") => {
                if self.peek_at(1).is_some_and(|t| t.is_word("NEXT")) {
                    self.pos += 1;
                    self.expect_word("NEXT")?;
                    self.expect_word("VALUE")?;
                    self.expect_word("FOR")?;
                    let name = self.identifier()?;
                    return Ok(Command::SequenceNext { name });
                }
                Ok(Command::Select(self.parse_select_query()?))
            }
            Token::Symbol("(") => Ok(Command::Select(self.parse_select_query()?)),
            other => Err(syntax_error(format!("unsupported statement: {other:?}"))),
        }
    }

    // ---- DDL ----

    fn parse_create(&mut self) -> Result<Command> {
        self.expect_word("CREATE")?;
        if self.eat_word("TABLE") {
            let if_not_exists = self.parse_if_not_exists()?;
            let name = self.identifier()?;
            self.expect_symbol("(")?;
            let mut columns = Vec::new();
            let mut primary_key = Vec::new();
            loop {
                if self.peek().is_some_and(|t| t.is_word("PRIMARY")) {
                    self.expect_word("PRIMARY")?;
                    self.expect_word("KEY")?;
                    self.expect_symbol("(")?;
                    loop {
                        primary_key.push(self.identifier()?);
                        if !self.eat_symbol(",") {
                            break;
                        }
                    }
                    self.expect_symbol(")")?;
                } else {
                    columns.push(self.parse_column_def()?);
                }
                if !self.eat_symbol(",") {
                    break;
                }
            }
            self.expect_symbol(")")?;
            Ok(Command::CreateTable {
                name,
                if_not_exists,
                columns,
                primary_key,
            })
        } else if self.eat_word("SEQUENCE") {
            let if_not_exists = self.parse_if_not_exists()?;
            let name = self.identifier()?;
            let mut start_with = 1;
            let mut increment_by = 1;
            loop {
                if self.eat_word("START") {
                    self.expect_word("WITH")?;
                    start_with = self.integer()?;
                } else if self.eat_word("INCREMENT") {
                    self.expect_word("BY")?;
                    increment_by = self.integer()?;
                } else {
                    break;
                }
            }
            Ok(Command::CreateSequence {
                name,
                if_not_exists,
                start_with,
                increment_by,
            })
        } else {
            Err(syntax_error("expected TABLE or SEQUENCE after CREATE"))
        }
    }

    fn parse_if_not_exists(&mut self) -> Result<bool> {
        if self.eat_word("IF") {
            self.expect_word("NOT")?;
            self.expect_word("EXISTS")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn parse_column_def(&mut self) -> Result<ColumnMeta> {
        let name = self.identifier()?;
        let prototype = self.parse_column_type()?;
        let mut column = ColumnMeta {
            name,
            prototype,
            nullable: true,
            primary_key: false,
            unique: false,
            identity: false,
        };
        loop {
            if self.eat_word("NOT") {
                self.expect_word("NULL")?;
                column.nullable = false;
            } else if self.eat_word("PRIMARY") {
                self.expect_word("KEY")?;
                column.primary_key = true;
                column.nullable = false;
            } else if self.eat_word("UNIQUE") {
                column.unique = true;
            } else if self.eat_word("AUTO_INCREMENT") || self.eat_word("IDENTITY") {
                column.identity = true;
            } else {
                break;
            }
        }
        Ok(column)
    }

    fn parse_column_type(&mut self) -> Result<Value> {
        let word = match self.next()? {
            Token::Word(w) => w.to_ascii_uppercase(),
            other => return Err(syntax_error(format!("expected a type, found {other:?}"))),
        };
        let prototype = match word.as_str() {
            "BOOLEAN" => Value::Boolean(None),
            "SMALLINT" => Value::Int16(None),
            "INTEGER" | "INT" => Value::Int32(None),
            "BIGINT" => Value::Int64(None),
            "REAL" => Value::Float32(None),
            "DOUBLE" => {
                self.eat_word("PRECISION");
                Value::Float64(None)
            }
            "DECIMAL" | "NUMERIC" => Value::Decimal(None),
            "VARCHAR" | "TEXT" => Value::Varchar(None),
            "BLOB" => Value::Blob(None),
            "DATE" => Value::Date(None),
            "TIME" => Value::Time(None),
            "TIMESTAMP" => {
                if self.eat_word("WITH") {
                    self.expect_word("TIME")?;
                    self.expect_word("ZONE")?;
                    Value::TimestampWithTimezone(None)
                } else {
                    Value::Timestamp(None)
                }
            }
            "TIMESTAMPTZ" => Value::TimestampWithTimezone(None),
            "UUID" => Value::Uuid(None),
            other => return Err(syntax_error(format!("unsupported column type `{other}`"))),
        };
        // A length/precision argument is accepted and ignored.
        if self.eat_symbol("(") {
            self.integer()?;
            if self.eat_symbol(",") {
                self.integer()?;
            }
            self.expect_symbol(")")?;
        }
        Ok(prototype)
    }

    fn parse_drop(&mut self) -> Result<Command> {
        self.expect_word("DROP")?;
        if self.eat_word("TABLE") {
            let if_exists = self.parse_if_exists()?;
            let name = self.identifier()?;
            Ok(Command::DropTable { name, if_exists })
        } else if self.eat_word("SEQUENCE") {
            let if_exists = self.parse_if_exists()?;
            let name = self.identifier()?;
            Ok(Command::DropSequence { name, if_exists })
        } else {
            Err(syntax_error("expected TABLE or SEQUENCE after DROP"))
        }
    }

    fn parse_if_exists(&mut self) -> Result<bool> {
        if self.eat_word("IF") {
            self.expect_word("EXISTS")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // ---- DML ----

    fn parse_insert(&mut self) -> Result<Command> {
        self.expect_word("INSERT")?;
        self.expect_word("INTO")?;
        let table = self.identifier()?;
        self.expect_symbol("(")?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.identifier()?);
            if !self.eat_symbol(",") {
                break;
            }
        }
        self.expect_symbol(")")?;
        self.expect_word("VALUES")?;
        let mut rows = Vec::new();
        loop {
            self.expect_symbol("(")?;
            let mut row = Vec::new();
            loop {
                row.push(self.parse_expr()?);
                if !self.eat_symbol(",") {
                    break;
                }
            }
            self.expect_symbol(")")?;
            rows.push(row);
            if !self.eat_symbol(",") {
                break;
            }
        }
        let on_conflict = if self.eat_word("ON") {
            self.expect_word("CONFLICT")?;
            self.expect_symbol("(")?;
            let mut keys = Vec::new();
            loop {
                keys.push(self.identifier()?);
                if !self.eat_symbol(",") {
                    break;
                }
            }
            self.expect_symbol(")")?;
            self.expect_word("DO")?;
            let action = if self.eat_word("NOTHING") {
                ConflictAction::Nothing
            } else {
                self.expect_word("UPDATE")?;
                self.expect_word("SET")?;
                ConflictAction::Update(self.parse_assignments()?)
            };
            Some(OnConflict { keys, action })
        } else {
            None
        };
        Ok(Command::Insert {
            table,
            columns,
            rows,
            on_conflict,
        })
    }

    fn parse_assignments(&mut self) -> Result<Vec<(String, Expr)>> {
        let mut assignments = Vec::new();
        loop {
            let column = self.identifier()?;
            self.expect_symbol("=")?;
            assignments.push((column, self.parse_expr()?));
            if !self.eat_symbol(",") {
                break;
            }
        }
        Ok(assignments)
    }

    fn parse_update(&mut self) -> Result<Command> {
        self.expect_word("UPDATE")?;
        let table = self.identifier()?;
        self.expect_word("SET")?;
        let assignments = self.parse_assignments()?;
        let filter = if self.eat_word("WHERE") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Command::Update {
            table,
            assignments,
            filter,
        })
    }

    fn parse_delete(&mut self) -> Result<Command> {
        self.expect_word("DELETE")?;
        self.expect_word("FROM")?;
        let table = self.identifier()?;
        let filter = if self.eat_word("WHERE") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Command::Delete { table, filter })
    }

    // ---- SELECT ----

    fn parse_select_query(&mut self) -> Result<SelectQuery> {
        let body = self.parse_select_body()?;
        let mut order_by = Vec::new();
        if self.eat_word("ORDER") {
            self.expect_word("BY")?;
            loop {
                let key = self.identifier()?;
                let asc = if self.eat_word("DESC") {
                    false
                } else {
                    self.eat_word("ASC");
                    true
                };
                order_by.push(OrderItem { key, asc });
                if !self.eat_symbol(",") {
                    break;
                }
            }
        }
        let limit = if self.eat_word("LIMIT") {
            Some(self.integer()? as u64)
        } else {
            None
        };
        let offset = if self.eat_word("OFFSET") {
            Some(self.integer()? as u64)
        } else {
            None
        };
        Ok(SelectQuery {
            body,
            order_by,
            limit,
            offset,
        })
    }

    fn parse_select_body(&mut self) -> Result<SelectBody> {
        let mut left = self.parse_select_primary()?;
        loop {
            let op = if self.peek().is_some_and(|t| t.is_word("UNION")) {
                self.pos += 1;
                if self.eat_word("ALL") {
                    SetOpKind::UnionAll
                } else {
                    SetOpKind::Union
                }
            } else if self.peek().is_some_and(|t| t.is_word("EXCEPT")) {
                self.pos += 1;
                SetOpKind::Except
            } else if self.peek().is_some_and(|t| t.is_word("INTERSECT")) {
                self.pos += 1;
                SetOpKind::Intersect
            } else {
                break;
            };
            let right = self.parse_select_primary()?;
            left = SelectBody::Compound {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_select_primary(&mut self) -> Result<SelectBody> {
        if self.eat_symbol("(") {
            let query = self.parse_select_query()?;
            self.expect_symbol(")")?;
            return Ok(SelectBody::Nested(Box::new(query)));
        }
        self.expect_word("SELECT")?;
        let distinct = self.eat_word("DISTINCT");
        let mut items = Vec::new();
        loop {
            if self.eat_symbol("*") {
                items.push(SelectItem::Star);
            } else {
                let expr = self.parse_expr()?;
                let alias = if self.eat_word("AS") {
                    Some(self.identifier()?)
                } else {
                    None
                };
                items.push(SelectItem::Expr { expr, alias });
            }
            if !self.eat_symbol(",") {
                break;
            }
        }
        self.expect_word("FROM")?;
        let table = self.identifier()?;
        for unsupported in ["JOIN", "INNER", "LEFT", "GROUP", "HAVING"] {
            if self.peek().is_some_and(|t| t.is_word(unsupported)) {
                return Err(syntax_error(format!(
                    "{unsupported} is not supported by the memory engine"
                )));
            }
        }
        let filter = if self.eat_word("WHERE") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(SelectBody::Simple(SimpleSelect {
            distinct,
            items,
            table,
            filter,
        }))
    }

    // ---- expressions ----

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_word("OR") {
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinOp::Or,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_not()?;
        while self.eat_word("AND") {
            let right = self.parse_not()?;
            left = Expr::Binary {
                op: BinOp::And,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.eat_word("NOT") {
            Ok(Expr::Not(Box::new(self.parse_not()?)))
        } else {
            self.parse_predicate()
        }
    }

    fn parse_predicate(&mut self) -> Result<Expr> {
        let target = self.parse_additive()?;
        if self.eat_word("IS") {
            let negate = self.eat_word("NOT");
            self.expect_word("NULL")?;
            return Ok(Expr::IsNull {
                target: Box::new(target),
                negate,
            });
        }
        // In predicate position a NOT only prefixes LIKE.
        let negate = if self.peek().is_some_and(|t| t.is_word("NOT"))
            && self.peek_at(1).is_some_and(|t| t.is_word("LIKE"))
        {
            self.pos += 1;
            true
        } else {
            false
        };
        if self.eat_word("LIKE") {
            let pattern = self.parse_additive()?;
            let escape = if self.eat_word("ESCAPE") {
                match self.next()? {
                    Token::Str(s) if s.chars().count() == 1 => s.chars().next(),
                    other => {
                        return Err(syntax_error(format!(
                            "expected a one character escape, found {other:?}"
                        )))
                    }
                }
            } else {
                None
            };
            return Ok(Expr::Like {
                target: Box::new(target),
                pattern: Box::new(pattern),
                escape,
                negate,
            });
        }
        if self.eat_word("BETWEEN") {
            let lower = self.parse_additive()?;
            self.expect_word("AND")?;
            let upper = self.parse_additive()?;
            return Ok(Expr::Between {
                target: Box::new(target),
                lower: Box::new(lower),
                upper: Box::new(upper),
            });
        }
        if self.eat_word("IN") {
            self.expect_symbol("(")?;
            let mut values = Vec::new();
            loop {
                values.push(self.parse_expr()?);
                if !self.eat_symbol(",") {
                    break;
                }
            }
            self.expect_symbol(")")?;
            return Ok(Expr::InList {
                target: Box::new(target),
                values,
            });
        }
        let op = if self.eat_symbol("=") {
            BinOp::Eq
        } else if self.eat_symbol("<>") {
            BinOp::NotEq
        } else if self.eat_symbol("<=") {
            BinOp::LessEq
        } else if self.eat_symbol("<") {
            BinOp::Less
        } else if self.eat_symbol(">=") {
            BinOp::GreaterEq
        } else if self.eat_symbol(">") {
            BinOp::Greater
        } else {
            return Ok(target);
        };
        let rhs = self.parse_additive()?;
        Ok(Expr::Binary {
            op,
            lhs: Box::new(target),
            rhs: Box::new(rhs),
        })
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.eat_symbol("+") {
                BinOp::Add
            } else if self.eat_symbol("-") {
                BinOp::Sub
            } else if self.eat_symbol("||") {
                BinOp::Concat
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.eat_symbol("*") {
                BinOp::Mul
            } else if self.eat_symbol("/") {
                BinOp::Div
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat_symbol("-") {
            Ok(Expr::Neg(Box::new(self.parse_unary()?)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        if self.eat_symbol("(") {
            let expr = self.parse_expr()?;
            self.expect_symbol(")")?;
            return Ok(expr);
        }
        let token = self.next()?.clone();
        match token {
            Token::Placeholder(index) => Ok(Expr::Placeholder(index)),
            Token::Str(text) => Ok(Expr::Literal(Value::Varchar(Some(text)))),
            Token::Number(text) => {
                if text.contains('.') || text.contains('e') || text.contains('E') {
                    let value: f64 = text
                        .parse()
                        .map_err(|_| syntax_error(format!("not a number: `{text}`")))?;
                    Ok(Expr::Literal(Value::Float64(Some(value))))
                } else {
                    let value: i64 = text
                        .parse()
                        .map_err(|_| syntax_error(format!("not a number: `{text}`")))?;
                    Ok(Expr::Literal(Value::Int64(Some(value))))
                }
            }
            Token::Word(word) if word.eq_ignore_ascii_case("TRUE") => {
                Ok(Expr::Literal(Value::Boolean(Some(true))))
            }
            Token::Word(word) if word.eq_ignore_ascii_case("FALSE") => {
                Ok(Expr::Literal(Value::Boolean(Some(false))))
            }
            Token::Word(word) if word.eq_ignore_ascii_case("NULL") => {
                Ok(Expr::Literal(Value::Null))
            }
            // Typed literals appearing in scripts.
            Token::Word(word)
                if word.eq_ignore_ascii_case("DATE")
                    && matches!(self.peek(), Some(Token::Str(..))) =>
            {
                let Token::Str(text) = self.next()?.clone() else {
                    unreachable!()
                };
                Ok(Expr::Literal(Value::Date(Some(coerce::parse_date(&text)?))))
            }
            Token::Word(word)
                if word.eq_ignore_ascii_case("TIME")
                    && matches!(self.peek(), Some(Token::Str(..))) =>
            {
                let Token::Str(text) = self.next()?.clone() else {
                    unreachable!()
                };
                Ok(Expr::Literal(Value::Time(Some(coerce::parse_time(&text)?))))
            }
            Token::Word(word)
                if word.eq_ignore_ascii_case("TIMESTAMP")
                    && matches!(self.peek(), Some(Token::Str(..))) =>
            {
                let Token::Str(text) = self.next()?.clone() else {
                    unreachable!()
                };
                Ok(Expr::Literal(Value::Timestamp(Some(
                    coerce::parse_timestamp(&text)?,
                ))))
            }
            Token::Word(word) if word.eq_ignore_ascii_case("EXCLUDED") => {
                self.expect_symbol(".")?;
                Ok(Expr::Excluded(self.identifier()?))
            }
            Token::Word(name) => self.parse_column(name),
            Token::Quoted(name) => self.parse_column(name),
            other => Err(syntax_error(format!("unexpected token {other:?}"))),
        }
    }

    fn parse_column(&mut self, first: String) -> Result<Expr> {
        if self.eat_symbol(".") {
            let name = self.identifier()?;
            Ok(Expr::Column {
                table: Some(first),
                name,
            })
        } else {
            Ok(Expr::Column {
                table: None,
                name: first,
            })
        }
    }
}
