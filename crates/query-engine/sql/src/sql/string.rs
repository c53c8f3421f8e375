//! Type definitions of a low-level SQL string representation.

/// A SQL string together with the parameters it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SQL {
    pub sql: String,
    pub params: Vec<Param>,
    /// for internal use and tests only
    pub param_index: u64,
}

impl Default for SQL {
    fn default() -> Self {
        Self::new()
    }
}

/// A parameter for a parameterized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// A literal string
    String(String),
}

impl SQL {
    pub fn new() -> SQL {
        SQL {
            sql: String::new(),
            params: vec![],
            param_index: 0,
        }
    }
    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }
    /// Append a quoted identifier. Embedded double quotes are doubled.
    pub fn append_identifier(&mut self, sql: &str) {
        self.sql.push('"');
        self.sql.push_str(&sql.replace('"', "\"\""));
        self.sql.push('"');
    }
    pub fn append_param(&mut self, param: Param) {
        self.param_index += 1;
        self.sql.push_str(format!("${}", self.param_index).as_str());
        self.params.push(param);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted_and_escaped() {
        let mut sql = SQL::new();
        sql.append_identifier("users");
        sql.append_syntax(".");
        sql.append_identifier("na\"me");
        assert_eq!(sql.sql, "\"users\".\"na\"\"me\"");
    }

    #[test]
    fn params_are_numbered_in_order() {
        let mut sql = SQL::new();
        sql.append_param(Param::String("a".to_string()));
        sql.append_syntax(", ");
        sql.append_param(Param::String("b".to_string()));
        assert_eq!(sql.sql, "$1, $2");
        assert_eq!(sql.param_index, 2);
        assert_eq!(
            sql.params,
            vec![Param::String("a".to_string()), Param::String("b".to_string())]
        );
    }
}
