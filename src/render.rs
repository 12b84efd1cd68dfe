// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements rendering of expression trees back to SQL text.

use crate::expression::{Expression, ExprKind};
use crate::util::{quote_ident, quote_string};

/// Output dialect. Unknown dialect names fall back to [`Generic`].
///
/// [`Generic`]: Self::Generic
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    Generic,
    Hive,
}

impl From<&str> for Dialect {
    fn from(name: &str) -> Self {
        if name.eq_ignore_ascii_case("hive") {
            Self::Hive
        } else {
            Self::Generic
        }
    }
}

/// Percent-valued target argument keys, in canonical output order.
const PERCENT_TARGETS: [&str; 4] = [
    "error_target",
    "confidence",
    "recall_target",
    "precision_target",
];

pub(crate) fn render(expression: &Expression, dialect: Dialect) -> String {
    Generator { dialect }.node(expression)
}

/// Walks a tree and emits canonical SQL. The default printers are shared by
/// all dialects; `hive` overrides the CTAS printer only.
struct Generator {
    dialect: Dialect,
}

impl Generator {
    fn node(&self, e: &Expression) -> String {
        use ExprKind::*;

        match e.kind {
            Alias => format!("{} AS {}", self.opt(e, "this"), self.opt(e, "alias")),
            And => format!("{} AND {}", self.opt(e, "this"), self.opt(e, "expression")),
            Or => format!("{} OR {}", self.opt(e, "this"), self.opt(e, "expression")),
            Annotation => match e.node("expression") {
                Some(target) => format!("{} #{}", self.node(target), e.text("this")),
                None => format!("#{}", e.text("this")),
            },
            Between => format!(
                "{} BETWEEN {} AND {}",
                self.opt(e, "this"),
                self.opt(e, "low"),
                self.opt(e, "high")
            ),
            Binary => format!(
                "{} {} {}",
                self.opt(e, "this"),
                e.text("op"),
                self.opt(e, "expression")
            ),
            Case => self.case(e),
            Cast => format!("CAST({} AS {})", self.opt(e, "this"), self.opt(e, "to")),
            Column => self.dotted(e, &["db", "table", "this"]),
            Command => e.text("this").to_owned(),
            Confidence => format!("CONFIDENCE {}%", e.text("this")),
            Create => self.create(e),
            ErrorTarget => format!("ERROR_TARGET {}%", e.text("this")),
            From => format!("FROM {}", self.csv(e.seq("expressions"))),
            Func => format!("{}({})", e.text("this"), self.csv(e.seq("expressions"))),
            GroupBy => format!("GROUP BY {}", self.csv(e.seq("expressions"))),
            Having => format!("HAVING {}", self.opt(e, "this")),
            Hint => format!("/*+ {} */", self.csv(e.seq("expressions"))),
            Identifier => {
                if e.flag("quoted") {
                    quote_ident(e.text("this"))
                } else {
                    e.text("this").to_owned()
                }
            }
            In => {
                let body = match e.node("query") {
                    Some(query) => self.node(query),
                    None => self.csv(e.seq("expressions")),
                };
                format!("{} IN ({})", self.opt(e, "this"), body)
            }
            IsNull => format!("{} IS NULL", self.opt(e, "this")),
            Join => {
                let prefix = e.text("kind");
                let join = format!("JOIN {} ON {}", self.opt(e, "this"), self.opt(e, "on"));
                if prefix.is_empty() {
                    join
                } else {
                    format!("{prefix} {join}")
                }
            }
            Like => format!("{} LIKE {}", self.opt(e, "this"), self.opt(e, "expression")),
            Limit => format!("LIMIT {}", self.opt(e, "this")),
            Literal => {
                if e.flag("is_string") {
                    quote_string(e.text("this"))
                } else {
                    e.text("this").to_owned()
                }
            }
            Not => format!("NOT {}", self.opt(e, "this")),
            Null => "NULL".to_owned(),
            OrderBy => format!("ORDER BY {}", self.csv(e.seq("expressions"))),
            Paren => format!("({})", self.opt(e, "this")),
            PrecisionTarget => format!("PRECISION_TARGET {}%", e.text("this")),
            Properties => self.csv(e.seq("expressions")),
            Property => format!(
                "{} = {}",
                quote_string(e.text("this")),
                quote_string(e.text("value"))
            ),
            RecallTarget => format!("RECALL_TARGET {}%", e.text("this")),
            Rlike => format!("{} RLIKE {}", self.opt(e, "this"), self.opt(e, "expression")),
            Select => self.select(e),
            Star => "*".to_owned(),
            Table => self.dotted(e, &["db", "this"]),
            Tuple => format!("({})", self.csv(e.seq("expressions"))),
            Unary => format!("{}{}", e.text("op"), self.opt(e, "this")),
            When => format!("WHEN {} THEN {}", self.opt(e, "this"), self.opt(e, "then")),
            Where => format!("WHERE {}", self.opt(e, "this")),
            Window => self.window(e),
        }
    }

    fn opt(&self, e: &Expression, key: &str) -> String {
        e.node(key).map(|child| self.node(child)).unwrap_or_default()
    }

    fn csv(&self, expressions: &[Expression]) -> String {
        expressions
            .iter()
            .map(|e| self.node(e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn dotted(&self, e: &Expression, keys: &[&str]) -> String {
        keys.iter()
            .filter_map(|key| e.node(key))
            .map(|part| self.node(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn select(&self, e: &Expression) -> String {
        let expressions = e.seq("expressions");

        let mut parts = Vec::new();
        if expressions.is_empty() {
            parts.push("SELECT".to_owned());
        } else {
            parts.push(format!("SELECT {}", self.csv(expressions)));
        }

        if let Some(from) = e.node("from") {
            parts.push(self.node(from));
        }
        for join in e.seq("joins") {
            parts.push(self.node(join));
        }
        for key in ["where", "group", "having", "order", "limit"] {
            if let Some(clause) = e.node(key) {
                parts.push(self.node(clause));
            }
        }
        for key in PERCENT_TARGETS {
            if let Some(target) = e.node(key) {
                parts.push(self.node(target));
            }
        }

        // A trailing annotation would swallow the next clause keyword, so
        // the separator after the projection list must be a newline.
        let trailing_annotation = expressions
            .last()
            .is_some_and(|last| last.kind == ExprKind::Annotation);
        if trailing_annotation && parts.len() > 1 {
            let head = parts.remove(0);
            format!("{}\n{}", head, parts.join(" "))
        } else {
            parts.join(" ")
        }
    }

    fn case(&self, e: &Expression) -> String {
        let mut out = String::from("CASE");
        if let Some(operand) = e.node("this") {
            out.push(' ');
            out.push_str(&self.node(operand));
        }
        for when in e.seq("ifs") {
            out.push(' ');
            out.push_str(&self.node(when));
        }
        if let Some(default) = e.node("default") {
            out.push_str(" ELSE ");
            out.push_str(&self.node(default));
        }
        out.push_str(" END");
        out
    }

    fn window(&self, e: &Expression) -> String {
        let mut over = String::new();
        let partition = e.seq("partition_by");
        if !partition.is_empty() {
            over.push_str("PARTITION BY ");
            over.push_str(&self.csv(partition));
        }
        if let Some(order) = e.node("order") {
            if !over.is_empty() {
                over.push(' ');
            }
            over.push_str(&self.node(order));
        }
        format!("{} OVER({})", self.opt(e, "this"), over)
    }

    fn create(&self, e: &Expression) -> String {
        let table = self.opt(e, "this");
        let select = self.opt(e, "expression");
        let properties = e
            .node("properties")
            .map(|p| p.seq("expressions"))
            .unwrap_or(&[]);

        match self.dialect {
            Dialect::Generic => format!("CREATE TABLE {table} AS {select}"),
            Dialect::Hive => {
                let mut out = format!("CREATE TABLE {table}");

                if let Some(format) = properties.iter().find(|p| p.text("this") == "format") {
                    out.push_str(" STORED AS ");
                    out.push_str(&format.text("value").to_uppercase());
                }

                let rest: Vec<_> = properties
                    .iter()
                    .filter(|p| p.text("this") != "format")
                    .map(|p| self.node(p))
                    .collect();
                if !rest.is_empty() {
                    out.push_str(" TBLPROPERTIES (");
                    out.push_str(&rest.join(", "));
                    out.push(')');
                }

                out.push_str(" AS ");
                out.push_str(&select);
                out
            }
        }
    }
}
