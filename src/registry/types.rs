use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// An installed application the registry reports as able to open files.
///
/// Identity is the bundle identifier. Two values with the same bundle id are
/// equal even when their name or path differ (for example after the app moved).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerApp {
    pub bundle_id: String,
    pub name: String,
    /// Absent when the bundle id is registered but no copy of the app can be
    /// located on disk.
    pub path: Option<PathBuf>,
}

impl HandlerApp {
    /// Build a handler record, deriving the display name when none is given.
    ///
    /// Name resolution order:
    /// 1. explicit `name`
    /// 2. bundle file name without the `.app` suffix, if `path` is known
    /// 3. last dot-separated component of the bundle id
    pub fn new(bundle_id: impl Into<String>, name: Option<String>, path: Option<PathBuf>) -> Self {
        let bundle_id = bundle_id.into();
        let name = name
            .or_else(|| path.as_deref().and_then(name_from_path))
            .unwrap_or_else(|| name_from_bundle_id(&bundle_id));

        Self {
            bundle_id,
            name,
            path,
        }
    }
}

impl PartialEq for HandlerApp {
    fn eq(&self, other: &Self) -> bool {
        self.bundle_id == other.bundle_id
    }
}

impl Eq for HandlerApp {}

impl Hash for HandlerApp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bundle_id.hash(state);
    }
}

impl fmt::Display for HandlerApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.bundle_id)
    }
}

fn name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.strip_suffix(".app").unwrap_or(file_name);
    Some(name.to_string())
}

// com.apple.Safari -> Safari
fn name_from_bundle_id(bundle_id: &str) -> String {
    bundle_id
        .rsplit('.')
        .next()
        .unwrap_or(bundle_id)
        .to_string()
}

/// Broad platform type families used to group extensions into categories.
///
/// Each family corresponds to a parent uniform type identifier; a resolved
/// type belongs to a family when it conforms to that parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeFamily {
    Pdf,
    Presentation,
    Spreadsheet,
    Text,
    SourceCode,
    Image,
    Audio,
    Movie,
    Video,
    Archive,
}

impl TypeFamily {
    pub const ALL: [TypeFamily; 10] = [
        TypeFamily::Pdf,
        TypeFamily::Presentation,
        TypeFamily::Spreadsheet,
        TypeFamily::Text,
        TypeFamily::SourceCode,
        TypeFamily::Image,
        TypeFamily::Audio,
        TypeFamily::Movie,
        TypeFamily::Video,
        TypeFamily::Archive,
    ];

    /// Parent type identifier for this family.
    pub fn identifier(&self) -> &'static str {
        match self {
            TypeFamily::Pdf => "com.adobe.pdf",
            TypeFamily::Presentation => "public.presentation",
            TypeFamily::Spreadsheet => "public.spreadsheet",
            TypeFamily::Text => "public.text",
            TypeFamily::SourceCode => "public.source-code",
            TypeFamily::Image => "public.image",
            TypeFamily::Audio => "public.audio",
            TypeFamily::Movie => "public.movie",
            TypeFamily::Video => "public.video",
            TypeFamily::Archive => "public.archive",
        }
    }
}

/// Outcome of mapping an extension through the platform type system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedType {
    pub identifier: String,
    /// Families the type conforms to, computed once at resolution time.
    pub families: BTreeSet<TypeFamily>,
}

impl ResolvedType {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            families: BTreeSet::new(),
        }
    }

    pub fn with_families(mut self, families: impl IntoIterator<Item = TypeFamily>) -> Self {
        self.families.extend(families);
        self
    }

    pub fn conforms_to(&self, family: TypeFamily) -> bool {
        self.families.contains(&family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_name_prefers_explicit_value() {
        let app = HandlerApp::new(
            "com.apple.Preview",
            Some("Preview Pro".to_string()),
            Some(PathBuf::from("/Applications/Preview.app")),
        );
        assert_eq!(app.name, "Preview Pro");
    }

    #[test]
    fn test_name_from_bundle_path() {
        let app = HandlerApp::new(
            "com.microsoft.VSCode",
            None,
            Some(PathBuf::from("/Applications/Visual Studio Code.app")),
        );
        assert_eq!(app.name, "Visual Studio Code");
    }

    #[test]
    fn test_name_falls_back_to_bundle_id_tail() {
        let app = HandlerApp::new("com.apple.Safari", None, None);
        assert_eq!(app.name, "Safari");

        let bare = HandlerApp::new("textedit", None, None);
        assert_eq!(bare.name, "textedit");
    }

    #[test]
    fn test_identity_is_bundle_id() {
        let a = HandlerApp::new("com.example.App", Some("Old Name".into()), None);
        let b = HandlerApp::new(
            "com.example.App",
            Some("New Name".into()),
            Some(PathBuf::from("/tmp/App.app")),
        );
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_resolved_type_families() {
        let resolved = ResolvedType::new("public.plain-text").with_families([TypeFamily::Text]);
        assert!(resolved.conforms_to(TypeFamily::Text));
        assert!(!resolved.conforms_to(TypeFamily::Image));
    }
}
