//! Prompt templates for the delegation loop

/// Templates for every follow-up request a delegation can issue
pub struct DelegationPromptTemplate;

impl DelegationPromptTemplate {
    /// Coder prompt asking only for the files still missing
    pub fn completion(instruction: &str, missing: &str) -> String {
        format!(
            r#"You already produced part of the requested code, but some files are missing. Produce ONLY the missing files.

**Original instruction**:
{}

**Missing files according to the verification**:
{}

Produce each missing file using this format:
# path/to/file.ext
```language
complete file contents
```"#,
            instruction, missing
        )
    }

    /// Reviewer prompt used when no expected file could be inferred locally
    pub fn verification(instruction: &str, written_paths: &[String]) -> String {
        let written = if written_paths.is_empty() {
            "- No file written".to_string()
        } else {
            written_paths
                .iter()
                .map(|p| format!("- {}", p))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            r#"COMPLETENESS CHECK - MANDATORY PROCEDURE

**Original instruction**:
{instruction}

**Files written to disk ({count})**:
{written}

**4-STEP PROCEDURE (MANDATORY)**:

1. EXTRACTION: list EVERY file mentioned in the instruction (one per line)
   Format: - file1.py
           - file2.py

2. COMPARISON: for each extracted file, check whether it is in the list of written files
   Accept variations: src/api.py == api.py (same file name)

3. COUNT: X files requested, Y files written

4. DECISION:
   - If X == Y and every file matches, answer: COMPLET
   - If X > Y or files are missing, answer: INCOMPLET: file1.py, file2.py

**IMPORTANT**: be strict but sensible. If the instruction says 'src/api.py' and the written file is 'api.py', that is OK (same name).
When in doubt, answer INCOMPLET."#,
            instruction = instruction,
            count = written_paths.len(),
            written = written,
        )
    }

    /// Validator prompt carrying the as-written file contents
    pub fn validation(files: &[(String, String)]) -> String {
        let mut prompt = String::from("Check this code produced by the CODER:\n\n");
        for (path, content) in files {
            prompt.push_str(&format!("# {}\n```\n{}\n```\n\n", path, content));
        }
        prompt.push_str("Answer VALIDE if the code is correct, otherwise INVALIDE followed by the problems found.");
        prompt
    }

    /// Coder prompt for the single correction round after an INVALIDE report
    pub fn correction(report: &str, instruction: &str) -> String {
        format!(
            r#"The VALIDATOR found problems in your code. Fix them.

VALIDATOR REPORT:
{}

ORIGINAL INSTRUCTION:
{}

Regenerate ONLY the files with problems. Follow the output format."#,
            report, instruction
        )
    }

    /// Reviewer prompt for the structural summary of written files
    pub fn structure_report(files: &[(String, String)]) -> String {
        let mut files_text = String::new();
        for (path, content) in files {
            files_text.push_str(&format!("\n### {}\n```\n{}\n```\n", path, content));
        }

        format!(
            r#"Analyze these files and produce a STRUCTURED REPORT.
For each file, list:
- File path
- Classes (name + methods with signatures)
- Free functions (name + signatures)
- Imports
- API routes (if any)
- External dependencies

MANDATORY format:
## path/file.py
- Classes: ClassName(method1(args), method2(args))
- Functions: func_name(args) -> return_type
- Imports: module1, module2
- Routes: GET /path, POST /path

Be CONCISE. No code, no explanation. Just the report.

--- FILES TO ANALYZE ---
{}"#,
            files_text
        )
    }

    /// Hint appended to a safety challenge
    pub fn confirmation_hint() -> &'static str {
        "💡 **To confirm this action**, use the 'Confirm' button or run `conductor confirm`."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_carries_missing_verbatim() {
        let p = DelegationPromptTemplate::completion("create a.py and b.py", "INCOMPLET: b.py");
        assert!(p.contains("create a.py and b.py"));
        assert!(p.contains("INCOMPLET: b.py"));
        assert!(p.contains("ONLY the missing files"));
    }

    #[test]
    fn test_verification_lists_written_files() {
        let p = DelegationPromptTemplate::verification("do it", &["a.py".to_string()]);
        assert!(p.contains("**Files written to disk (1)**:\n- a.py"));

        let empty = DelegationPromptTemplate::verification("do it", &[]);
        assert!(empty.contains("- No file written"));
    }

    #[test]
    fn test_validation_includes_contents() {
        let files = vec![("a.py".to_string(), "x = 1".to_string())];
        let p = DelegationPromptTemplate::validation(&files);
        assert!(p.contains("# a.py\n```\nx = 1\n```"));
        assert!(p.contains("INVALIDE"));
    }

    #[test]
    fn test_structure_report_format_matches_compaction() {
        let p = DelegationPromptTemplate::structure_report(&[]);
        assert!(p.contains("- Classes:"));
        assert!(p.contains("- Functions:"));
    }
}
