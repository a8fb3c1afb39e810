//! Generator backed by an external command

use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use super::batch::parse_items;
use super::protocol::{GenerateRequest, GenerateResponse};
use super::{GenerationError, Generator, PromptContext};
use crate::domain::{ArtifactKind, GeneratedBatch};
use crate::storage::GeneratorConfig;

/// Runs a configured command once per generation request
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    command: PathBuf,
    args: Vec<String>,

    /// Environment variable that must hold the service credential
    credential_env: String,
}

impl CommandGenerator {
    pub fn new(command: impl Into<PathBuf>, args: Vec<String>, credential_env: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args,
            credential_env: credential_env.into(),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GenerationError> {
        let command = config.command.as_ref().ok_or(GenerationError::NotConfigured)?;
        Ok(Self::new(command, config.args.clone(), &config.credential_env))
    }

    fn check_credential(&self) -> Result<(), GenerationError> {
        match std::env::var(&self.credential_env) {
            Ok(value) if !value.trim().is_empty() => Ok(()),
            _ => Err(GenerationError::MissingCredential(self.credential_env.clone())),
        }
    }

    fn exchange(&self, request: &GenerateRequest) -> Result<GenerateResponse, GenerationError> {
        let request_err = |what: &str, e: std::io::Error| {
            GenerationError::Request(format!("{} {}: {}", what, self.command.display(), e))
        };

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| request_err("Failed to spawn", e))?;

        let request_json = serde_json::to_string(request)
            .map_err(|e| GenerationError::Request(format!("Failed to serialize request: {}", e)))?;
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| GenerationError::Request("Generator stdin unavailable".to_string()))?;
            writeln!(stdin, "{}", request_json).map_err(|e| request_err("Failed to write to", e))?;
        }

        // An undrained stderr pipe stalls the generator once it fills
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GenerationError::Request("Generator stdout unavailable".to_string()))?;
        let response_line = BufReader::new(stdout)
            .lines()
            .next()
            .transpose()
            .map_err(|e| request_err("Failed to read from", e))?;

        let status = child.wait().map_err(|e| request_err("Failed to wait for", e))?;
        let diagnostics = stderr
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        let diagnostics = diagnostics.trim();
        if !diagnostics.is_empty() {
            log::debug!("{} stderr: {}", self.command.display(), diagnostics);
        }

        let Some(response_line) = response_line else {
            let mut message = format!("{} exited ({}) without a response", self.command.display(), status);
            if !diagnostics.is_empty() {
                message.push_str(": ");
                message.push_str(diagnostics);
            }
            return Err(GenerationError::Request(message));
        };

        serde_json::from_str(&response_line)
            .map_err(|e| GenerationError::MalformedResponse(format!("not a response line: {}", e)))
    }
}

impl Generator for CommandGenerator {
    fn generate(
        &self,
        kind: ArtifactKind,
        context: &PromptContext,
    ) -> Result<GeneratedBatch, GenerationError> {
        self.check_credential()?;

        log::debug!("Requesting {} from {}", kind.plural(), self.command.display());
        let response = self.exchange(&GenerateRequest::new(kind, context.clone()))?;

        if !response.success {
            return Err(GenerationError::Request(
                response
                    .error
                    .unwrap_or_else(|| "generator reported failure".to_string()),
            ));
        }

        let batch = parse_items(kind, response.items)?;
        log::info!("Generator returned {} {}", batch.len(), kind.plural());
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_generator_is_an_error() {
        let config = GeneratorConfig::default();
        assert_eq!(
            CommandGenerator::from_config(&config).unwrap_err(),
            GenerationError::NotConfigured
        );
    }

    #[test]
    fn missing_credential_is_reported_before_spawning() {
        let generator = CommandGenerator::new(
            "/definitely/not/a/real/generator",
            vec![],
            "SCAFFOLD_TEST_UNSET_CREDENTIAL",
        );

        let err = generator
            .generate(ArtifactKind::Schema, &PromptContext::default())
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::MissingCredential("SCAFFOLD_TEST_UNSET_CREDENTIAL".to_string())
        );
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        const CREDENTIAL: &str = "SCAFFOLD_TEST_PROCESS_CREDENTIAL";

        fn script(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("generator.sh");
            std::fs::write(&path, format!("#!/bin/sh\nread line\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn run(body: &str, kind: ArtifactKind) -> Result<GeneratedBatch, GenerationError> {
            std::env::set_var(CREDENTIAL, "test-key");
            let dir = TempDir::new().unwrap();
            let generator = CommandGenerator::new(script(&dir, body), vec![], CREDENTIAL);
            generator.generate(kind, &PromptContext::default())
        }

        #[test]
        fn reads_items_from_response_line() {
            let batch = run(
                r#"echo '{"success":true,"items":[{"name":"User","content":"const User = 1;"}]}'"#,
                ArtifactKind::Schema,
            )
            .unwrap();

            assert_eq!(batch.len(), 1);
        }

        #[test]
        fn non_json_output_is_malformed() {
            let err = run("echo 'hello there'", ArtifactKind::Schema).unwrap_err();
            assert!(matches!(err, GenerationError::MalformedResponse(_)));
        }

        #[test]
        fn reported_failure_is_request_error() {
            let err = run(
                r#"echo '{"success":false,"error":"quota exceeded"}'"#,
                ArtifactKind::Router,
            )
            .unwrap_err();
            assert_eq!(err, GenerationError::Request("quota exceeded".to_string()));
        }

        #[test]
        fn silent_exit_is_request_error() {
            let err = run("exit 3", ArtifactKind::Router).unwrap_err();
            assert!(matches!(err, GenerationError::Request(_)));
        }

        #[test]
        fn stderr_is_included_when_no_response_arrives() {
            let err = run("echo 'token rejected' >&2; exit 1", ArtifactKind::Schema).unwrap_err();
            match err {
                GenerationError::Request(message) => assert!(message.contains("token rejected")),
                other => panic!("unexpected error: {:?}", other),
            }
        }

        #[test]
        fn large_stderr_does_not_block_the_response() {
            let batch = run(
                r#"head -c 262144 /dev/zero | tr '\0' 'x' >&2
echo '{"success":true,"items":[{"name":"User","content":"const User = 1;"}]}'"#,
                ArtifactKind::Schema,
            )
            .unwrap();

            assert_eq!(batch.len(), 1);
        }
    }
}
