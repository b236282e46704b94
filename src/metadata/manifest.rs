use std::{fs, io::Write, path::Path};

use compact_str::{CompactString, ToCompactString};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{denylist::Denylist, error::{ErrorKind, Result}};

use super::{staging_path, DEPENDENCY_SECTIONS};

/// A `package.json` document. Key order and number literals are kept as read.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Manifest {
    fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub section: &'static str,
    pub package: CompactString,
}

impl Manifest {
    pub fn read(path: &Path) -> Result<Self> {
        let d = fs::read_to_string(path)?;

        Self::parse(&d)
    }

    pub fn parse(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ErrorKind::NotAnObject { found: value_kind(&other) }),
        }
    }

    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.fields.get(name).and_then(Value::as_object)
    }

    pub fn dependency_count(&self) -> usize {
        DEPENDENCY_SECTIONS.iter()
            .filter_map(|name| self.section(name))
            .map(Map::len)
            .sum()
    }

    /// Drops every denylisted entry from the dependency sections.
    ///
    /// Sections are visited in `DEPENDENCY_SECTIONS` order and entries in document
    /// order, which is also the order of the returned removals. A section that is
    /// present but not an object fails the whole manifest.
    pub fn scrub(&mut self, denylist: &Denylist) -> Result<Vec<Removal>> {
        let mut removed = Vec::new();

        for section in DEPENDENCY_SECTIONS {
            let Some(value) = self.fields.get_mut(section) else {
                continue
            };

            let Some(deps) = value.as_object_mut() else {
                return Err(ErrorKind::InvalidSection { section, found: value_kind(value) })
            };

            deps.retain(|package, _| {
                if denylist.matches(package) {
                    removed.push(Removal { section, package: package.to_compact_string() });
                    false
                } else {
                    true
                }
            });
        }

        Ok(removed)
    }

    /// Two-space indented JSON with a trailing newline.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');

        Ok(out)
    }

    /// Stages the new text next to `path` and renames it over the original,
    /// carrying the original's permissions across.
    pub fn write(&self, path: &Path) -> Result<()> {
        let out = self.to_pretty_string()?;
        let tmp_path = staging_path(path);
        let permissions = fs::metadata(path).ok().map(|m| m.permissions());

        let staged = fs::File::create(&tmp_path).and_then(|mut file| {
            file.write_all(out.as_bytes())?;
            if let Some(permissions) = permissions {
                file.set_permissions(permissions)?;
            }
            file.sync_all()
        });

        if let Err(e) = staged.and_then(|_| fs::rename(&tmp_path, path)) {
            _ = fs::remove_file(&tmp_path);
            return Err(ErrorKind::Write(e))
        }

        Ok(())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrubs_all_four_sections() {
        let mut manifest = Manifest::parse(r#"{
            "name": "app",
            "dependencies": { "rowsncolumns-core": "1.0.0", "lodash": "4.0.0" },
            "devDependencies": { "@RowsNColumns/spreadsheet": "2.0.0" },
            "peerDependencies": { "react": "^18" },
            "optionalDependencies": { "problematic-package": "*", "fsevents": "2" }
        }"#).unwrap();

        let removed = manifest.scrub(&Denylist::default()).unwrap();

        assert_eq!(removed, vec![
            Removal { section: "dependencies", package: "rowsncolumns-core".into() },
            Removal { section: "devDependencies", package: "@RowsNColumns/spreadsheet".into() },
            Removal { section: "optionalDependencies", package: "problematic-package".into() },
        ]);

        assert_eq!(manifest.section("dependencies").unwrap().keys().collect::<Vec<_>>(), vec!["lodash"]);
        assert!(manifest.section("devDependencies").unwrap().is_empty());
        assert_eq!(manifest.section("peerDependencies").unwrap().len(), 1);
        assert_eq!(manifest.section("optionalDependencies").unwrap().keys().collect::<Vec<_>>(), vec!["fsevents"]);
        assert_eq!(manifest.dependency_count(), 3);
    }

    #[test]
    fn leaves_other_keys_alone() {
        let mut manifest = Manifest::parse(r#"{
            "name": "app",
            "scripts": { "rowsncolumns": "echo hi" },
            "resolutions": { "rowsncolumns-core": "1.0.0" }
        }"#).unwrap();

        let removed = manifest.scrub(&Denylist::default()).unwrap();

        assert!(removed.is_empty());
        assert!(manifest.section("scripts").unwrap().contains_key("rowsncolumns"));
        assert!(manifest.section("resolutions").unwrap().contains_key("rowsncolumns-core"));
    }

    #[test]
    fn rejects_non_object_section() {
        let mut manifest = Manifest::parse(r#"{ "dependencies": ["rowsncolumns"] }"#).unwrap();

        let err = manifest.scrub(&Denylist::default()).unwrap_err();

        assert!(matches!(err, ErrorKind::InvalidSection { section: "dependencies", found: "an array" }));
    }

    #[test]
    fn rejects_non_object_document() {
        let err = Manifest::parse("[1, 2]").unwrap_err();

        assert!(matches!(err, ErrorKind::NotAnObject { found: "an array" }));
        assert_eq!(err.to_string(), "manifest is not a JSON object (found an array)");
        assert!(matches!(Manifest::parse("\"dependencies\""), Err(ErrorKind::NotAnObject { found: "a string" })));
        assert!(matches!(Manifest::parse("{ \"name\": "), Err(ErrorKind::Serde(_))));
    }

    #[test]
    fn number_literals_survive_a_rewrite() {
        let mut manifest = Manifest::parse(
            r#"{"x": 123456789012345678901234567890, "y": 1e2, "z": 0.1, "dependencies": {"rowsncolumns": "1"}}"#
        ).unwrap();
        manifest.scrub(&Denylist::default()).unwrap();

        let expected = "{\n  \"x\": 123456789012345678901234567890,\n  \"y\": 1e2,\n  \"z\": 0.1,\n  \"dependencies\": {}\n}\n";
        assert_eq!(manifest.to_pretty_string().unwrap(), expected);
    }

    #[test]
    fn pretty_output_keeps_key_order() {
        let mut manifest = Manifest::parse(
            r#"{"version":"1.0.0","name":"z","dependencies":{"zeta":"1","rowsncolumns":"1","alpha":"2"}}"#
        ).unwrap();
        manifest.scrub(&Denylist::default()).unwrap();

        let expected = "{\n  \"version\": \"1.0.0\",\n  \"name\": \"z\",\n  \"dependencies\": {\n    \"zeta\": \"1\",\n    \"alpha\": \"2\"\n  }\n}\n";
        assert_eq!(manifest.to_pretty_string().unwrap(), expected);
    }

    #[test]
    fn write_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"dependencies":{"rowsncolumns":"1"}}"#).unwrap();

        let mut manifest = Manifest::read(&path).unwrap();
        manifest.scrub(&Denylist::default()).unwrap();
        manifest.write(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"dependencies\": {}\n}\n");
        assert!(!staging_path(&path).exists());
    }

    #[cfg(unix)]
    #[test]
    fn write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"dependencies":{"rowsncolumns":"1"}}"#).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        let mut manifest = Manifest::read(&path).unwrap();
        manifest.scrub(&Denylist::default()).unwrap();
        manifest.write(&path).unwrap();

        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"dependencies\": {}\n}\n");
    }

    #[test]
    fn failed_write_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("package.json");

        let manifest = Manifest::parse("{}").unwrap();

        assert!(matches!(manifest.write(&path), Err(ErrorKind::Write(_))));
        assert!(!path.exists());
    }
}
