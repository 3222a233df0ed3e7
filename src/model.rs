//! Typed model of a parsed go.mod manifest
//!
//! A [`Manifest`] is an ordered list of [`Statement`]s, always kept sorted by
//! statement priority. Ties keep their insertion order and duplicates are
//! never merged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, ModuleRefError};
use crate::parser::ManifestParser;
use crate::utils::{is_quoted, quote_if_needed};

/// A module path with an optional version.
///
/// The name is never empty, a present version is never empty, and neither
/// contains a `"`, so every reference can be written back as manifest text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawModuleRef")]
pub struct ModuleRef {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

/// Unchecked shape of a serialized [`ModuleRef`]
#[derive(Deserialize)]
struct RawModuleRef {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

impl TryFrom<RawModuleRef> for ModuleRef {
    type Error = ModuleRefError;

    fn try_from(raw: RawModuleRef) -> Result<Self, Self::Error> {
        match raw.version {
            Some(version) => Self::try_with_version(raw.name, version),
            None => Self::try_new(raw.name),
        }
    }
}

impl ModuleRef {
    /// Reference without a version
    pub fn try_new(name: impl Into<String>) -> Result<Self, ModuleRefError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModuleRefError::EmptyName);
        }
        check_unquoted(&name)?;
        Ok(Self {
            name,
            version: None,
        })
    }

    pub fn try_with_version(
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, ModuleRefError> {
        let module = Self::try_new(name)?;
        let version = version.into();
        if version.is_empty() {
            return Err(ModuleRefError::EmptyVersion { name: module.name });
        }
        check_unquoted(&version)?;
        Ok(Self {
            version: Some(version),
            ..module
        })
    }

    /// Reference without a version.
    ///
    /// # Panics
    ///
    /// If `name` is empty or contains a `"`. Use [`ModuleRef::try_new`] for
    /// untrusted input.
    pub fn new(name: impl Into<String>) -> Self {
        match Self::try_new(name) {
            Ok(module) => module,
            Err(e) => panic!("invalid module reference: {e}"),
        }
    }

    /// Versioned reference.
    ///
    /// # Panics
    ///
    /// Under the same conditions as [`ModuleRef::try_with_version`] fails.
    pub fn with_version(name: impl Into<String>, version: impl Into<String>) -> Self {
        match Self::try_with_version(name, version) {
            Ok(module) => module,
            Err(e) => panic!("invalid module reference: {e}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

fn check_unquoted(value: &str) -> Result<(), ModuleRefError> {
    if value.contains('"') {
        return Err(ModuleRefError::Quote {
            value: value.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_if_needed(&self.name))?;
        if let Some(version) = &self.version {
            write!(f, " {}", quote_if_needed(version))?;
        }
        Ok(())
    }
}

/// Statement variant tag, used for lookups and ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Module,
    Require,
    Replace,
    Exclude,
    Custom,
}

impl StatementKind {
    /// Sort class; lower values are written first
    pub fn priority(self) -> u32 {
        match self {
            StatementKind::Module => 0,
            StatementKind::Require => 1,
            StatementKind::Replace => 2,
            StatementKind::Exclude => 3,
            StatementKind::Custom => 100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Module => "module",
            StatementKind::Require => "require",
            StatementKind::Replace => "replace",
            StatementKind::Exclude => "exclude",
            StatementKind::Custom => "custom",
        }
    }

    /// Parse a kind name, ignoring case
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "module" => Some(StatementKind::Module),
            "require" => Some(StatementKind::Require),
            "replace" => Some(StatementKind::Replace),
            "exclude" => Some(StatementKind::Exclude),
            "custom" => Some(StatementKind::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declaration of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Statement {
    /// The manifest's own module path
    Module(ModuleRef),
    /// A required dependency
    Require(ModuleRef),
    /// Substitutes `from` with `to`
    Replace { from: ModuleRef, to: ModuleRef },
    /// A version that must not be selected
    Exclude(ModuleRef),
    /// Any other directive. Tokens are kept verbatim (quoted strings keep their
    /// quotes, `(` and `)` mark a block) so unknown directives survive a rewrite.
    Custom { keyword: String, tokens: Vec<String> },
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Module(_) => StatementKind::Module,
            Statement::Require(_) => StatementKind::Require,
            Statement::Replace { .. } => StatementKind::Replace,
            Statement::Exclude(_) => StatementKind::Exclude,
            Statement::Custom { .. } => StatementKind::Custom,
        }
    }

    pub fn priority(&self) -> u32 {
        self.kind().priority()
    }

    /// Directive keyword as written in the manifest
    pub fn keyword(&self) -> &str {
        match self {
            Statement::Custom { keyword, .. } => keyword,
            other => other.kind().as_str(),
        }
    }

    /// Module paths mentioned by this statement (none for custom directives)
    pub fn module_names(&self) -> Vec<&str> {
        match self {
            Statement::Module(m) | Statement::Require(m) | Statement::Exclude(m) => vec![m.name()],
            Statement::Replace { from, to } => vec![from.name(), to.name()],
            Statement::Custom { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Module(m) => write!(f, "module {m}"),
            Statement::Require(m) => write!(f, "require {m}"),
            Statement::Replace { from, to } => write!(f, "replace {from} => {to}"),
            Statement::Exclude(m) => write!(f, "exclude {m}"),
            Statement::Custom { keyword, tokens } => {
                f.write_str(&quote_if_needed(keyword))?;
                for token in tokens {
                    match token.as_str() {
                        "(" => f.write_str(" (\n")?,
                        ")" => f.write_str("\n )")?,
                        t if t == "=>" || is_quoted(t) => write!(f, " {t}")?,
                        t => write!(f, " {}", quote_if_needed(t))?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// Parsed manifest: statements sorted by priority, then insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Statement>", into = "Vec<Statement>")]
pub struct Manifest {
    statements: Vec<Statement>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest text with the default parser
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        ManifestParser::new().parse(content)
    }

    /// Build from statements in source order; sorting is stable
    pub fn from_statements(mut statements: Vec<Statement>) -> Self {
        statements.sort_by_key(Statement::priority);
        Self { statements }
    }

    /// Insert a statement after every statement of equal or lower priority.
    ///
    /// Same result as pushing and stable-sorting, without the sort.
    pub fn add_statement(&mut self, statement: Statement) -> &mut Self {
        let priority = statement.priority();
        let idx = self
            .statements
            .partition_point(|s| s.priority() <= priority);
        self.statements.insert(idx, statement);
        self
    }

    /// All statements of the given kind, in manifest order
    pub fn find(&self, kind: StatementKind) -> Vec<&Statement> {
        self.statements.iter().filter(|s| s.kind() == kind).collect()
    }

    /// First `module` declaration, if any
    pub fn module(&self) -> Option<&ModuleRef> {
        self.statements.iter().find_map(|s| match s {
            Statement::Module(m) => Some(m),
            _ => None,
        })
    }

    pub fn requires(&self) -> impl Iterator<Item = &ModuleRef> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Require(m) => Some(m),
            _ => None,
        })
    }

    pub fn replaces(&self) -> impl Iterator<Item = (&ModuleRef, &ModuleRef)> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Replace { from, to } => Some((from, to)),
            _ => None,
        })
    }

    pub fn excludes(&self) -> impl Iterator<Item = &ModuleRef> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Exclude(m) => Some(m),
            _ => None,
        })
    }

    /// Custom directives as `(keyword, tokens)`
    pub fn customs(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Custom { keyword, tokens } => Some((keyword.as_str(), tokens.as_slice())),
            _ => None,
        })
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Total number of statements
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Manifest::parse(s)
    }
}

impl From<Vec<Statement>> for Manifest {
    fn from(statements: Vec<Statement>) -> Self {
        Manifest::from_statements(statements)
    }
}

impl From<Manifest> for Vec<Statement> {
    fn from(manifest: Manifest) -> Self {
        manifest.statements
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn require(name: &str, version: &str) -> Statement {
        Statement::Require(ModuleRef::with_version(name, version))
    }

    #[test]
    fn test_module_ref_display() {
        assert_eq!(ModuleRef::new("example.com/a").to_string(), "example.com/a");
        assert_eq!(
            ModuleRef::with_version("example.com/a", "v1.0.0").to_string(),
            "example.com/a v1.0.0"
        );
        assert_eq!(
            ModuleRef::with_version("my module", "v 1").to_string(),
            "\"my module\" \"v 1\""
        );
    }

    #[test]
    fn test_module_ref_equality_and_order() {
        assert_eq!(ModuleRef::new("a"), ModuleRef::new("a"));
        assert_ne!(ModuleRef::new("a"), ModuleRef::with_version("a", "v1"));
        assert!(ModuleRef::new("a") < ModuleRef::new("b"));
        assert!(ModuleRef::new("a") < ModuleRef::with_version("a", "v1"));
    }

    #[test]
    fn test_priorities() {
        assert_eq!(StatementKind::Module.priority(), 0);
        assert_eq!(StatementKind::Require.priority(), 1);
        assert_eq!(StatementKind::Replace.priority(), 2);
        assert_eq!(StatementKind::Exclude.priority(), 3);
        assert_eq!(StatementKind::Custom.priority(), 100);
    }

    #[test]
    fn test_statement_display() {
        assert_eq!(require("a", "v1").to_string(), "require a v1");
        assert_eq!(
            Statement::Replace {
                from: ModuleRef::new("a"),
                to: ModuleRef::with_version("b", "v2"),
            }
            .to_string(),
            "replace a => b v2"
        );
        assert_eq!(
            Statement::Exclude(ModuleRef::with_version("z", "v0.9.1")).to_string(),
            "exclude z v0.9.1"
        );
        assert_eq!(
            Statement::Custom {
                keyword: "go".to_string(),
                tokens: vec!["1.11".to_string()],
            }
            .to_string(),
            "go 1.11"
        );
    }

    #[test]
    fn test_custom_block_display() {
        let statement = Statement::Custom {
            keyword: "retract".to_string(),
            tokens: ["(", "v1.0.0", "v1.0.1", ")"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        };
        assert_eq!(statement.to_string(), "retract (\n v1.0.0 v1.0.1\n )");
    }

    #[test]
    fn test_add_statement_is_stable() {
        let mut manifest = Manifest::new();
        manifest
            .add_statement(Statement::Exclude(ModuleRef::new("z")))
            .add_statement(require("x", "v1"))
            .add_statement(require("y", "v2"))
            .add_statement(Statement::Module(ModuleRef::new("m")));

        assert_eq!(
            manifest.to_string(),
            "module m\nrequire x v1\nrequire y v2\nexclude z"
        );
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let mut manifest = Manifest::new();
        manifest.add_statement(require("a", "v1"));
        manifest.add_statement(require("a", "v1"));
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.find(StatementKind::Require).len(), 2);
    }

    #[test]
    fn test_from_statements_sorts_stably() {
        let custom = Statement::Custom {
            keyword: "go".to_string(),
            tokens: vec!["1.21".to_string()],
        };
        let manifest = Manifest::from_statements(vec![
            custom.clone(),
            require("b", "v2"),
            Statement::Module(ModuleRef::new("m")),
            require("a", "v1"),
        ]);
        let names: Vec<&str> = manifest.requires().map(ModuleRef::name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(manifest.statements()[0].kind(), StatementKind::Module);
        assert_eq!(manifest.statements()[3], custom);
    }

    #[test]
    fn test_typed_accessors() {
        let mut manifest = Manifest::new();
        manifest
            .add_statement(Statement::Module(ModuleRef::new("m")))
            .add_statement(Statement::Replace {
                from: ModuleRef::new("a"),
                to: ModuleRef::new("../a"),
            })
            .add_statement(Statement::Custom {
                keyword: "toolchain".to_string(),
                tokens: vec!["go1.21.0".to_string()],
            });

        assert_eq!(manifest.module().map(ModuleRef::name), Some("m"));
        assert_eq!(manifest.replaces().count(), 1);
        assert_eq!(manifest.excludes().count(), 0);
        let (keyword, tokens) = manifest.customs().next().unwrap();
        assert_eq!(keyword, "toolchain");
        assert_eq!(tokens, ["go1.21.0".to_string()]);
        assert!(!manifest.is_empty());
    }

    #[test]
    fn test_module_names() {
        let replace = Statement::Replace {
            from: ModuleRef::new("a"),
            to: ModuleRef::new("b"),
        };
        assert_eq!(replace.module_names(), vec!["a", "b"]);
        assert_eq!(replace.keyword(), "replace");
        let custom = Statement::Custom {
            keyword: "go".to_string(),
            tokens: vec![],
        };
        assert!(custom.module_names().is_empty());
        assert_eq!(custom.keyword(), "go");
    }

    #[test]
    fn test_kind_from_str_loose() {
        assert_eq!(
            StatementKind::from_str_loose("Require"),
            Some(StatementKind::Require)
        );
        assert_eq!(StatementKind::from_str_loose("go"), None);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(require("a", "v1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "require", "name": "a", "version": "v1"})
        );

        let json = serde_json::to_value(Statement::Require(ModuleRef::new("a"))).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "require", "name": "a"}));
    }

    #[test]
    fn test_json_restores_order() {
        let json = serde_json::json!([
            {"kind": "exclude", "name": "z"},
            {"kind": "module", "name": "m"}
        ]);
        let manifest: Manifest = serde_json::from_value(json).unwrap();
        assert_eq!(manifest.to_string(), "module m\nexclude z");
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert_eq!(ModuleRef::try_new(""), Err(ModuleRefError::EmptyName));
        assert_eq!(
            ModuleRef::try_with_version("", "v1"),
            Err(ModuleRefError::EmptyName)
        );
        assert_eq!(
            ModuleRef::try_with_version("a", ""),
            Err(ModuleRefError::EmptyVersion {
                name: "a".to_string()
            })
        );
        assert!(matches!(
            ModuleRef::try_new("a\"b"),
            Err(ModuleRefError::Quote { .. })
        ));
        assert_eq!(
            ModuleRef::try_with_version("a", "v1"),
            Ok(ModuleRef::with_version("a", "v1"))
        );
    }

    #[test]
    #[should_panic(expected = "module name must not be empty")]
    fn test_new_panics_on_empty_name() {
        let _ = ModuleRef::new("");
    }

    #[test]
    fn test_json_with_empty_name_is_rejected() {
        for json in [
            r#"[{"kind":"require","name":""}]"#,
            r#"[{"kind":"require","name":"a","version":""}]"#,
            r#"[{"kind":"replace","from":{"name":"a"},"to":{"name":""}}]"#,
            r#"[{"kind":"module","name":"a\"b"}]"#,
        ] {
            let message = serde_json::from_str::<Manifest>(json)
                .unwrap_err()
                .to_string();
            assert!(
                message.contains("must not be empty") || message.contains("double quote"),
                "input: {json}: {message}"
            );
        }
    }
}
