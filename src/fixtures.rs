#[cfg(test)]
pub mod test {
    use std::convert::Infallible;

    use crate::record::{Field, Record};

    /// A type with no builtin parser.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Foo;

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct MyString(pub String);

    pub fn strings(s: &str) -> Result<String, Infallible> {
        Ok(s.to_string())
    }

    pub fn concat3(a: &str, b: &str, c: &str) -> Result<MyString, Infallible> {
        Ok(MyString(format!("{a}{b}{c}")))
    }

    // -- Single-field fixtures ----------------------------------------------

    #[derive(Debug, Default)]
    pub struct SingleConfig {
        pub f: String,
    }

    impl Record for SingleConfig {
        fn record_name(&self) -> &'static str {
            "SingleConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::tagged("f", "FOO2", &mut self.f)]
        }
    }

    #[derive(Debug, Default)]
    pub struct MissingConfig {
        pub f: String,
    }

    impl Record for MissingConfig {
        fn record_name(&self) -> &'static str {
            "MissingConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::tagged("f", "FOO3", &mut self.f)]
        }
    }

    #[derive(Debug, Default)]
    pub struct MultiConfig {
        pub f: MyString,
    }

    impl Record for MultiConfig {
        fn record_name(&self) -> &'static str {
            "MultiConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::tagged("f", "A,B,C", &mut self.f).with_default("three,two,one")]
        }
    }

    #[derive(Debug, Default)]
    pub struct NoParserConfig {
        pub f: MyString,
    }

    impl Record for NoParserConfig {
        fn record_name(&self) -> &'static str {
            "NoParserConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::tagged("f", "A,B", &mut self.f)]
        }
    }

    #[derive(Debug, Default)]
    pub struct GreetingConfig {
        pub f: MyString,
    }

    impl Record for GreetingConfig {
        fn record_name(&self) -> &'static str {
            "GreetingConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::tagged("f", "GREETING", &mut self.f).with_default(r"Hello\, Grandpa!")]
        }
    }

    /// A valid field followed by one whose default tag is short a value.
    #[derive(Debug, Default)]
    pub struct BadDefaultsConfig {
        pub before: String,
        pub f: MyString,
    }

    impl Record for BadDefaultsConfig {
        fn record_name(&self) -> &'static str {
            "BadDefaultsConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::tagged("before", "BEFORE", &mut self.before),
                Field::tagged("f", "A,B,C", &mut self.f).with_default("X,Y"),
            ]
        }
    }

    #[derive(Debug, Default)]
    pub struct BuggyConfig {
        pub b: Foo,
        pub sibling: String,
    }

    impl Record for BuggyConfig {
        fn record_name(&self) -> &'static str {
            "BuggyConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::tagged("b", "BAR", &mut self.b),
                Field::tagged("sibling", "SIBLING", &mut self.sibling).with_default("unset"),
            ]
        }
    }

    // -- Embedding fixtures -------------------------------------------------

    #[derive(Debug, Default, PartialEq)]
    pub struct DatabaseConfig {
        pub host: String,
        pub port: u16,
        pub password: String,
    }

    impl Record for DatabaseConfig {
        fn record_name(&self) -> &'static str {
            "DatabaseConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::tagged("host", "DB_HOST", &mut self.host),
                Field::tagged("port", "DB_PORT", &mut self.port),
                Field::tagged("password", "DB_PASSWORD", &mut self.password)
                    .with_default("default_pass"),
            ]
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct LogConfig {
        pub level: String,
        pub format: String,
    }

    impl Record for LogConfig {
        fn record_name(&self) -> &'static str {
            "LogConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::tagged("level", "LOG_LEVEL", &mut self.level),
                Field::tagged("format", "LOG_FORMAT", &mut self.format).with_default("json"),
            ]
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct LayeredConfig {
        pub database: DatabaseConfig,
        pub log: LogConfig,
        pub api_key: String,
        pub untagged: i32,
    }

    impl Record for LayeredConfig {
        fn record_name(&self) -> &'static str {
            "LayeredConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::embedded("database", &mut self.database),
                Field::embedded("log", &mut self.log),
                Field::tagged("api_key", "API_KEY", &mut self.api_key),
                Field::untagged("untagged"),
            ]
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct GrandchildConfig {
        pub setting: String,
    }

    impl Record for GrandchildConfig {
        fn record_name(&self) -> &'static str {
            "GrandchildConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![Field::tagged("setting", "GRANDCHILD_SETTING", &mut self.setting)]
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct ChildConfig {
        pub grandchild: GrandchildConfig,
        pub child_setting: String,
    }

    impl Record for ChildConfig {
        fn record_name(&self) -> &'static str {
            "ChildConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::embedded("grandchild", &mut self.grandchild),
                Field::tagged("child_setting", "CHILD_SETTING", &mut self.child_setting),
            ]
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct ParentConfig {
        pub child: ChildConfig,
        pub parent_setting: String,
    }

    impl Record for ParentConfig {
        fn record_name(&self) -> &'static str {
            "ParentConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::embedded("child", &mut self.child),
                Field::tagged("parent_setting", "PARENT_SETTING", &mut self.parent_setting),
            ]
        }
    }

    /// Embeds a `ChildConfig` and also holds one as a plain named field.
    #[derive(Debug, Default, PartialEq)]
    pub struct MixedConfig {
        pub child: ChildConfig,
        pub named: ChildConfig,
        pub direct: String,
    }

    impl Record for MixedConfig {
        fn record_name(&self) -> &'static str {
            "MixedConfig"
        }

        fn fields(&mut self) -> Vec<Field<'_>> {
            vec![
                Field::embedded("child", &mut self.child),
                Field::untagged("named"),
                Field::tagged("direct", "DIRECT_SETTING", &mut self.direct),
            ]
        }
    }

    #[test]
    fn fixtures_name_themselves() {
        assert_eq!(LayeredConfig::default().record_name(), "LayeredConfig");
        assert_eq!(MixedConfig::default().named, ChildConfig::default());
    }
}
