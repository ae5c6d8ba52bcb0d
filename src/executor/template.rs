use hashbrown::HashMap;
use regex::{Captures, Regex};

use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Z][A-Z0-9_]*)\}").expect("ERROR: invalid placeholder regex")
});

/// Substitute `{UPPERCASE_KEY}` placeholders in a submission template.
///
/// Placeholders without a value are left verbatim, so templates may carry
/// scheduler syntax or shell braces the renderer knows nothing about.
///
/// # Example
///
/// ``` rust, no_run
/// # use hashbrown::HashMap;
/// # use looper::executor::template::render_template;
/// let mut values = HashMap::new();
/// values.insert("JOBNAME".to_string(), "frog_1_rna.sh".to_string());
///
/// let script = render_template("#SBATCH --job-name='{JOBNAME}'\n{CODE}", &values);
///
/// assert_eq!(script, "#SBATCH --job-name='frog_1_rna.sh'\n{CODE}");
/// ```
pub fn render_template(template: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let mut values = HashMap::new();
        values.insert("JOBNAME".to_string(), "lump1_rna.sh".to_string());
        values.insert("CORES".to_string(), "4".to_string());
        values.insert("CODE".to_string(), "a.sh\nb.sh".to_string());

        let template = "#!/bin/bash\n#SBATCH --job-name='{JOBNAME}'\n#SBATCH --cpus-per-task='{CORES}'\n#SBATCH --mem='{MEM}'\n${HOME} {lower}\n{CODE}\n";
        let script = render_template(template, &values);

        assert_eq!(
            script,
            "#!/bin/bash\n#SBATCH --job-name='lump1_rna.sh'\n#SBATCH --cpus-per-task='4'\n#SBATCH --mem='{MEM}'\n${HOME} {lower}\na.sh\nb.sh\n"
        );
    }
}
