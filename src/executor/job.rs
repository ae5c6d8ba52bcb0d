/// A single pipeline command, one line of a submission script.
///
/// # Example
///
/// ```rust, no_run
/// use looper::executor::job::Job;
///
/// let job = Job::from("/repo/pipelines/rna.sh")
///     .arg(" --sample-name frog_1")
///     .arg("-O results_pipeline");
///
/// assert_eq!(job.cmd(), "/repo/pipelines/rna.sh --sample-name frog_1 -O results_pipeline");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub cmd: String,
}

impl Job {
    /// Create a new empty job
    pub fn new() -> Self {
        Self { cmd: String::new() }
    }

    /// Add an argument fragment to the job
    ///
    /// Fragments are trimmed and joined with a single space; empty
    /// fragments are ignored.
    ///
    /// # Example
    ///
    /// ```rust, no_run
    /// use looper::executor::job::Job;
    ///
    /// let job = Job::from("rna.sh").arg("  --genome hg38").arg("");
    ///
    /// assert_eq!(job.cmd(), "rna.sh --genome hg38");
    /// ```
    pub fn arg(mut self, arg: &str) -> Self {
        let arg = arg.trim();
        if arg.is_empty() {
            return self;
        }

        if !self.cmd.is_empty() {
            self.cmd.push(' ');
        }
        self.cmd.push_str(arg);
        self
    }

    /// Add multiple argument fragments to the job
    pub fn args(mut self, args: &[&str]) -> Self {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Job {
    fn from(cmd: &str) -> Self {
        Self::new().arg(cmd)
    }
}

impl From<String> for Job {
    fn from(cmd: String) -> Self {
        Self::from(cmd.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_joins_fragments() {
        let job = Job::from("rna.sh")
            .arg(" --sample-name frog_1 --single")
            .args(&["", " -O results", "-P 4 "]);

        assert_eq!(job.cmd(), "rna.sh --sample-name frog_1 --single -O results -P 4");
        assert_eq!(Job::new().arg("  ").cmd(), "");
    }
}
