//! Secret reference resolver.
//!
//! Credential values in `config.toml` can point at secrets stored outside
//! the file:
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used as-is

use thiserror::Error;

/// Failure to resolve a secret reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("failed to run `pass show {path}`: {reason}")]
    Pass { path: String, reason: String },

    #[error("`pass show {0}` produced no output")]
    EmptyPass(String),

    #[error("environment variable `{0}` is not set")]
    MissingEnv(String),
}

/// Resolves a value that may carry a `pass::` or `env::` prefix.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    if let Some(path) = value.strip_prefix("pass::") {
        resolve_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        std::env::var(var).map_err(|_| SecretError::MissingEnv(var.to_string()))
    } else {
        Ok(value.to_string())
    }
}

/// Returns true if the value is a reference rather than a literal.
pub fn is_reference(value: &str) -> bool {
    value.starts_with("pass::") || value.starts_with("env::")
}

fn resolve_pass(path: &str) -> Result<String, SecretError> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| SecretError::Pass {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SecretError::Pass {
            path: path.to_string(),
            reason: format!("exit {}: {}", output.status, stderr.trim()),
        });
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|line| line.to_string())
        .ok_or_else(|| SecretError::EmptyPass(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(resolve("hello").unwrap(), "hello");
        assert_eq!(resolve("").unwrap(), "");
        assert_eq!(
            resolve("contoso.onmicrosoft.com").unwrap(),
            "contoso.onmicrosoft.com"
        );
    }

    #[test]
    fn env_prefix_resolves() {
        unsafe {
            std::env::set_var("_GRAPHCAL_TEST_SECRET", "my-secret-value");
        }
        assert_eq!(
            resolve("env::_GRAPHCAL_TEST_SECRET").unwrap(),
            "my-secret-value"
        );
        unsafe {
            std::env::remove_var("_GRAPHCAL_TEST_SECRET");
        }
    }

    #[test]
    fn env_prefix_missing_var_errors() {
        let err = resolve("env::_GRAPHCAL_NONEXISTENT_VAR_12345").unwrap_err();
        assert_eq!(
            err,
            SecretError::MissingEnv("_GRAPHCAL_NONEXISTENT_VAR_12345".to_string())
        );
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn pass_prefix_unknown_entry_errors() {
        // Fails whether or not `pass` is installed.
        let result = resolve("pass::nonexistent/graphcal/entry/12345");
        assert!(result.is_err());
    }

    #[test]
    fn detects_references() {
        assert!(is_reference("pass::azure/graphcal"));
        assert!(is_reference("env::GRAPHCAL_CLIENT_SECRET"));
        assert!(!is_reference("literal-secret"));
    }
}
