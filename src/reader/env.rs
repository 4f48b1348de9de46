//! Environment-variable overrides for typed configuration.
//!
//! A configuration type lists the fields that may be overridden, each
//! under a tag.  The variable consulted is the tag upper-cased:
//! a field tagged `access_token` is overridden by `ACCESS_TOKEN`.

/// A mutable field that an environment variable may overwrite.
pub enum EnvSlot<'a> {
    /// Takes the variable's value verbatim.
    Text(&'a mut String),
    /// Becomes `true` when the variable is exactly `"true"`, else `false`.
    Flag(&'a mut bool),
}

/// One overridable field and its tag.
pub struct EnvField<'a> {
    tag: &'static str,
    slot: EnvSlot<'a>,
}

impl<'a> EnvField<'a> {
    pub fn text(tag: &'static str, field: &'a mut String) -> Self {
        Self {
            tag,
            slot: EnvSlot::Text(field),
        }
    }

    pub fn flag(tag: &'static str, field: &'a mut bool) -> Self {
        Self {
            tag,
            slot: EnvSlot::Flag(field),
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Name of the environment variable for this field.
    pub fn env_var(&self) -> String {
        self.tag.to_uppercase()
    }

    fn assign(self, value: &str) {
        match self.slot {
            EnvSlot::Text(field) => *field = value.to_string(),
            EnvSlot::Flag(field) => *field = value == "true",
        }
    }
}

/// Implemented by configuration types that accept environment overrides.
///
/// ```
/// use credentials::reader::{EnvField, EnvOverrides};
///
/// #[derive(serde::Deserialize)]
/// struct AppConfig {
///     access_token: String,
///     debug: bool,
///     pool_size: u32,
/// }
///
/// impl EnvOverrides for AppConfig {
///     fn env_fields(&mut self) -> Vec<EnvField<'_>> {
///         vec![
///             EnvField::text("access_token", &mut self.access_token),
///             EnvField::flag("debug", &mut self.debug),
///         ]
///     }
/// }
/// ```
pub trait EnvOverrides {
    fn env_fields(&mut self) -> Vec<EnvField<'_>>;
}

/// Overwrite every listed field whose variable is set and non-empty.
/// Returns the number of fields overwritten.
pub fn apply_env_overrides<T, L>(target: &mut T, lookup: L) -> usize
where
    T: EnvOverrides + ?Sized,
    L: Fn(&str) -> Option<String>,
{
    let mut applied = 0;
    for field in target.env_fields() {
        if let Some(value) = lookup(&field.env_var()).filter(|v| !v.is_empty()) {
            field.assign(&value);
            applied += 1;
        }
    }
    applied
}
