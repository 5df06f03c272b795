/// A binary to run inside the container and its arguments, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub binary: String,
    pub args: Vec<String>,
}

impl RunRequest {
    /// Run `binary` with `args` appended verbatim.
    pub fn binary(binary: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            binary: binary.into(),
            args,
        }
    }

    /// Join `args` with spaces and hand the result to `shell -c`, so the
    /// in-container shell does the word splitting, globbing and `&&`.
    pub fn shell(shell: impl Into<String>, args: &[String]) -> Self {
        Self {
            binary: shell.into(),
            args: vec!["-c".to_string(), args.join(" ")],
        }
    }

    /// Container command line: the binary followed by its arguments.
    pub fn command(&self) -> Vec<String> {
        let mut cmd = Vec::with_capacity(self.args.len() + 1);
        cmd.push(self.binary.clone());
        cmd.extend(self.args.iter().cloned());
        cmd
    }
}
