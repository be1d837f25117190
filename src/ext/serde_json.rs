// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path access into tracker JSON (e.g. "fields.assignee.displayName") with typed, validated extraction
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper; `require` turns missing/mistyped fields into DataIntegrity errors
// invariants: No panics; missing paths and JSON null both read as absent
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;

use crate::error::{ReportError, Result};

/// Wrapper around a JSON location to allow typed extraction via a clear second step.
pub struct JsonFetched<'a> {
  path: String,
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  /// Attempt to deserialize the fetched value as `T`.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.present().and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Deserialize as `T`, returning `T::default()` on failure.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }

  /// Deserialize as `T`; absent or mistyped values are integrity errors naming `context`.
  pub fn require<T>(&self, context: &str) -> Result<T>
  where
    T: DeserializeOwned,
  {
    let v = self
      .present()
      .ok_or_else(|| ReportError::integrity(format!("{context}: missing field '{}'", self.path)))?;

    serde_json::from_value::<T>(v.clone()).map_err(|e| {
      ReportError::integrity(format!("{context}: field '{}' has unexpected shape: {e}", self.path))
    })
  }

  /// Raw value, treating JSON null as absent.
  pub fn present(&self) -> Option<&'a serde_json::Value> {
    self.inner.filter(|v| !v.is_null())
  }
}

/// Extension to fetch nested values via dotted paths like "fields.status.name".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { path: String::new(), inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { path: path.to_string(), inner: None },
      }
    }

    JsonFetched { path: path.to_string(), inner: Some(cur) }
  }
}
