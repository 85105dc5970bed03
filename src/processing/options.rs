//! Resize option parsing and normalization

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ResizeMode;
use crate::error::{ImageUtilError, Result};

/// Option keys accepted by [`ResizeRequest::from_value`]
pub const RECOGNIZED_OPTIONS: [&str; 7] = [
    "source",
    "destination",
    "width",
    "height",
    "resizeMode",
    "overwrite",
    "information",
];

/// What to do with option keys outside [`RECOGNIZED_OPTIONS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Fail validation on the first unrecognized key
    #[default]
    Strict,
    /// Drop unrecognized keys
    Lenient,
}

/// A validated resize request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeRequest {
    /// Image to read
    pub source: PathBuf,
    /// Output file, or a directory when it has no extension
    pub destination: PathBuf,
    /// Target box width in pixels
    pub width: u32,
    /// Target box height in pixels
    pub height: u32,
    /// How the image is fitted into the box
    pub resize_mode: ResizeMode,
    /// Replace an existing destination file
    pub overwrite: bool,
    /// Read back metadata of the written file
    pub information: bool,
}

impl ResizeRequest {
    /// Create a request with default mode, overwrite and information settings
    pub fn new<S, D>(source: S, destination: D, width: u32, height: u32) -> Self
    where
        S: Into<PathBuf>,
        D: Into<PathBuf>,
    {
        Self {
            source: source.into(),
            destination: destination.into(),
            width,
            height,
            resize_mode: ResizeMode::default(),
            overwrite: false,
            information: true,
        }
    }

    /// Set the resize mode
    pub fn resize_mode(mut self, mode: ResizeMode) -> Self {
        self.resize_mode = mode;
        self
    }

    /// Allow replacing an existing destination file
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Read back metadata of the written file
    pub fn information(mut self, information: bool) -> Self {
        self.information = information;
        self
    }

    /// Normalize and check a request built in code.
    ///
    /// Applies the same trimming and positivity rules as [`Self::from_value`].
    pub fn validate(self) -> Result<Self> {
        let source = normalize_path(&self.source, "source")?;
        let destination = normalize_path(&self.destination, "destination")?;
        let width = positive_dimension(u64::from(self.width), "width")?;
        let height = positive_dimension(u64::from(self.height), "height")?;

        Ok(Self {
            source,
            destination,
            width,
            height,
            ..self
        })
    }

    /// Parse and validate raw resize options.
    ///
    /// Fails as a unit: any bad field rejects the whole request.
    pub fn from_value(value: &Value, strictness: Strictness) -> Result<Self> {
        let options = value.as_object().ok_or_else(|| {
            ImageUtilError::validation(format!(
                "Invalid resize options: expected an object, got {}",
                value_kind(value)
            ))
        })?;

        check_unrecognized(options, strictness)?;

        let source = required_string(options, "source")?;
        let destination = required_string(options, "destination")?;
        let width = required_dimension(options, "width")?;
        let height = required_dimension(options, "height")?;

        let resize_mode = match present(options, "resizeMode") {
            None => ResizeMode::default(),
            Some(Value::String(mode)) => {
                if mode.trim().is_empty() {
                    return Err(ImageUtilError::validation(
                        "Invalid resize option 'resizeMode': must not be empty",
                    ));
                }
                mode.parse()?
            }
            Some(other) => return Err(type_mismatch("resizeMode", "a string", other)),
        };

        let overwrite = optional_bool(options, "overwrite", false)?;
        let information = optional_bool(options, "information", true)?;

        Ok(Self {
            source: PathBuf::from(source),
            destination: PathBuf::from(destination),
            width,
            height,
            resize_mode,
            overwrite,
            information,
        })
    }
}

fn check_unrecognized(options: &Map<String, Value>, strictness: Strictness) -> Result<()> {
    for key in options.keys() {
        if RECOGNIZED_OPTIONS.contains(&key.as_str()) {
            continue;
        }

        match strictness {
            Strictness::Strict => {
                return Err(ImageUtilError::validation(format!(
                    "Unrecognized resize option: '{}'",
                    key
                )));
            }
            Strictness::Lenient => debug!("Dropping unrecognized resize option: {:?}", key),
        }
    }

    Ok(())
}

/// Value of `key`, treating an explicit `null` as absent
fn present<'a>(options: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    options.get(key).filter(|value| !value.is_null())
}

fn missing(key: &str) -> ImageUtilError {
    ImageUtilError::validation(format!("Missing required resize option: '{}'", key))
}

fn type_mismatch(key: &str, expected: &str, found: &Value) -> ImageUtilError {
    ImageUtilError::validation(format!(
        "Invalid resize option '{}': expected {}, got {}",
        key,
        expected,
        value_kind(found)
    ))
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

fn required_string(options: &Map<String, Value>, key: &str) -> Result<String> {
    match present(options, key) {
        None => Err(missing(key)),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(ImageUtilError::validation(format!(
                    "Invalid resize option '{}': must not be empty",
                    key
                )));
            }
            Ok(trimmed.to_string())
        }
        Some(other) => Err(type_mismatch(key, "a string", other)),
    }
}

fn required_dimension(options: &Map<String, Value>, key: &str) -> Result<u32> {
    let value = present(options, key).ok_or_else(|| missing(key))?;

    let integer = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(u) = n.as_u64() {
                i64::try_from(u).unwrap_or(i64::MAX)
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
                    _ => return Err(type_mismatch(key, "an integer", value)),
                }
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| type_mismatch(key, "an integer", value))?,
        other => return Err(type_mismatch(key, "an integer", other)),
    };

    if integer <= 0 {
        return Err(ImageUtilError::validation(format!(
            "Invalid resize option '{}': must be greater than 0, got {}",
            key, integer
        )));
    }

    positive_dimension(integer as u64, key)
}

fn positive_dimension(value: u64, key: &str) -> Result<u32> {
    match u32::try_from(value) {
        Ok(0) => Err(ImageUtilError::validation(format!(
            "Invalid resize option '{}': must be greater than 0, got 0",
            key
        ))),
        Ok(v) => Ok(v),
        Err(_) => Err(ImageUtilError::validation(format!(
            "Invalid resize option '{}': {} exceeds the maximum of {}",
            key,
            value,
            u32::MAX
        ))),
    }
}

fn optional_bool(options: &Map<String, Value>, key: &str, default: bool) -> Result<bool> {
    match present(options, key) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(value @ Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(type_mismatch(key, "a boolean", value)),
        },
        Some(other) => Err(type_mismatch(key, "a boolean", other)),
    }
}

fn normalize_path(path: &Path, key: &str) -> Result<PathBuf> {
    let trimmed = path
        .to_str()
        .map(|s| s.trim().to_string())
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf());

    if trimmed.as_os_str().is_empty() {
        return Err(ImageUtilError::validation(format!(
            "Invalid resize option '{}': must not be empty",
            key
        )));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "source": "data/test.png",
            "destination": "temp/test_resized.png",
            "width": 8,
            "height": 6
        })
    }

    fn with(key: &str, value: Value) -> Value {
        let mut options = valid();
        options[key] = value;
        options
    }

    fn without(key: &str) -> Value {
        let mut options = valid();
        options.as_object_mut().unwrap().remove(key);
        options
    }

    #[test]
    fn test_defaults_applied() {
        let request = ResizeRequest::from_value(&valid(), Strictness::Strict).unwrap();
        assert_eq!(request.source, PathBuf::from("data/test.png"));
        assert_eq!(request.width, 8);
        assert_eq!(request.height, 6);
        assert_eq!(request.resize_mode, ResizeMode::Fit);
        assert!(!request.overwrite);
        assert!(request.information);
    }

    #[test]
    fn test_rejects_non_objects() {
        for value in [
            Value::Null,
            json!(false),
            json!(true),
            json!(0),
            json!(1),
            json!(3.141592654),
            json!(""),
            json!("test"),
            json!(" trim\t"),
            json!([]),
            json!([0]),
        ] {
            let result = ResizeRequest::from_value(&value, Strictness::Strict);
            assert!(result.is_err(), "accepted {}", value);
        }
    }

    #[test]
    fn test_rejects_missing_required() {
        assert!(ResizeRequest::from_value(&json!({}), Strictness::Strict).is_err());
        assert!(ResizeRequest::from_value(&json!({ "nice": "meme" }), Strictness::Lenient).is_err());

        for key in ["source", "destination", "width", "height"] {
            let err = ResizeRequest::from_value(&without(key), Strictness::Strict).unwrap_err();
            assert!(err.to_string().contains(key), "{}", err);

            let err = ResizeRequest::from_value(&with(key, Value::Null), Strictness::Strict);
            assert!(err.is_err());
        }
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        for bad in [json!(-1), json!(0), json!(2.5), json!("wide"), json!(true), json!(1e12)] {
            assert!(ResizeRequest::from_value(&with("width", bad.clone()), Strictness::Strict).is_err());
            assert!(ResizeRequest::from_value(&with("height", bad), Strictness::Strict).is_err());
        }
    }

    #[test]
    fn test_coerces_integral_dimensions() {
        let request =
            ResizeRequest::from_value(&with("width", json!(8.0)), Strictness::Strict).unwrap();
        assert_eq!(request.width, 8);

        let request =
            ResizeRequest::from_value(&with("height", json!(" 6 ")), Strictness::Strict).unwrap();
        assert_eq!(request.height, 6);
    }

    #[test]
    fn test_trims_paths() {
        let request = ResizeRequest::from_value(
            &with("destination", json!("  out/a.png\t")),
            Strictness::Strict,
        )
        .unwrap();
        assert_eq!(request.destination, PathBuf::from("out/a.png"));

        assert!(ResizeRequest::from_value(&with("destination", json!("\t")), Strictness::Strict).is_err());
        assert!(ResizeRequest::from_value(&with("source", json!(" ")), Strictness::Strict).is_err());
        assert!(ResizeRequest::from_value(&with("source", json!(42)), Strictness::Strict).is_err());
    }

    #[test]
    fn test_resize_mode_validation() {
        let err = ResizeRequest::from_value(&with("resizeMode", json!("scalar")), Strictness::Strict)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid image resize mode: 'scalar'!");

        let request =
            ResizeRequest::from_value(&with("resizeMode", json!(" CoNtAiN ")), Strictness::Strict)
                .unwrap();
        assert_eq!(request.resize_mode, ResizeMode::Contain);

        assert!(ResizeRequest::from_value(&with("resizeMode", json!("  ")), Strictness::Strict).is_err());
        assert!(ResizeRequest::from_value(&with("resizeMode", json!(3)), Strictness::Strict).is_err());

        let request =
            ResizeRequest::from_value(&with("resizeMode", Value::Null), Strictness::Strict).unwrap();
        assert_eq!(request.resize_mode, ResizeMode::Fit);
    }

    #[test]
    fn test_boolean_options() {
        let request =
            ResizeRequest::from_value(&with("overwrite", json!(true)), Strictness::Strict).unwrap();
        assert!(request.overwrite);

        let request =
            ResizeRequest::from_value(&with("information", json!("False")), Strictness::Strict)
                .unwrap();
        assert!(!request.information);

        assert!(ResizeRequest::from_value(&with("overwrite", json!({})), Strictness::Strict).is_err());
        assert!(ResizeRequest::from_value(&with("information", json!(1)), Strictness::Strict).is_err());
    }

    #[test]
    fn test_unrecognized_keys() {
        let options = with("quality", json!(90));

        let err = ResizeRequest::from_value(&options, Strictness::Strict).unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized resize option: 'quality'");

        let request = ResizeRequest::from_value(&options, Strictness::Lenient).unwrap();
        assert_eq!(request, ResizeRequest::from_value(&valid(), Strictness::Strict).unwrap());
    }

    #[test]
    fn test_builder_validation() {
        let request = ResizeRequest::new(" in.png ", "out.png\n", 8, 6)
            .resize_mode(ResizeMode::Cover)
            .overwrite(true)
            .information(false)
            .validate()
            .unwrap();
        assert_eq!(request.source, PathBuf::from("in.png"));
        assert_eq!(request.destination, PathBuf::from("out.png"));
        assert_eq!(request.resize_mode, ResizeMode::Cover);
        assert!(request.overwrite);
        assert!(!request.information);

        assert!(ResizeRequest::new("in.png", "out.png", 0, 6).validate().is_err());
        assert!(ResizeRequest::new("   ", "out.png", 8, 6).validate().is_err());
    }
}
