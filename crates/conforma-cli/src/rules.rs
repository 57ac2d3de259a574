//! File-driven build rules.
//!
//! A rules file is a YAML sequence of `BuildRule` records, decoded
//! against [`BuildRule::list_schema`] so documents can use the computed
//! functions (Wildcard for dependency lists, Matrix for families of
//! similar rules) before this module ever sees them.

use anyhow::{Context, Result, bail};
use conforma_schema::{Field, Schema};
use conforma_yaml::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq)]
pub struct BuildRule {
    pub target: PathBuf,
    pub dependencies: Vec<PathBuf>,
    pub command: Vec<String>,
}

impl BuildRule {
    /// Schema for one rule. `dependencies` defaults to empty so leaf
    /// rules can omit it.
    pub fn schema() -> Schema {
        Schema::record(
            "BuildRule",
            vec![
                Field::new("target", Schema::string()),
                Field::with_default(
                    "dependencies",
                    Schema::sequence(Schema::string()),
                    Value::Seq(Vec::new()),
                ),
                Field::new("command", Schema::sequence(Schema::string())),
            ],
        )
    }

    /// Schema for a whole rules file.
    pub fn list_schema() -> Schema {
        Schema::sequence(Self::schema())
    }

    /// Convert a decoded rules document into rules. The decode against
    /// [`list_schema`](Self::list_schema) guarantees the shape, so any
    /// failure here means the document was not decoded first.
    pub fn from_document(document: &Value) -> Result<Vec<BuildRule>> {
        let Some(entries) = document.as_seq() else {
            bail!("rules document is not a sequence; decode it against the rules schema first");
        };
        entries.iter().map(Self::from_entry).collect()
    }

    fn from_entry(entry: &Value) -> Result<BuildRule> {
        let target = entry
            .get("target")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .context("rule entry is missing 'target'")?;
        let dependencies = str_list(entry.get("dependencies"))
            .into_iter()
            .map(PathBuf::from)
            .collect();
        let command = str_list(entry.get("command"));
        Ok(BuildRule {
            target,
            dependencies,
            command,
        })
    }
}

fn str_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_seq)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A target is stale when it does not exist or any dependency was
/// modified after it.
fn needs_update(target: &Path, dependencies: &[PathBuf]) -> Result<bool> {
    if !target.exists() {
        return Ok(true);
    }
    let target_time = mtime(target)?;
    for dep in dependencies {
        if mtime(dep)? > target_time {
            return Ok(true);
        }
    }
    Ok(false)
}

fn mtime(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("failed to stat {}", path.display()))
}

/// Depth-first rule runner keyed by target path.
struct Runner<'a> {
    rules: HashMap<String, &'a BuildRule>,
    order: Vec<String>,
    dry_run: bool,
    done: HashSet<String>,
}

impl<'a> Runner<'a> {
    fn new(rules: &'a [BuildRule], dry_run: bool) -> Self {
        let mut keyed = HashMap::new();
        let mut order = Vec::with_capacity(rules.len());
        for rule in rules {
            let name = rule.target.display().to_string();
            keyed.insert(name.clone(), rule);
            order.push(name);
        }
        Runner {
            rules: keyed,
            order,
            dry_run,
            done: HashSet::new(),
        }
    }

    fn run(&mut self) -> Result<()> {
        for name in self.order.clone() {
            self.run_target(&name)?;
        }
        Ok(())
    }

    fn run_target(&mut self, name: &str) -> Result<()> {
        let Some(rule) = self.rules.get(name).copied() else {
            // A dependency without a rule is fine as long as it
            // already exists on disk (a source file).
            if Path::new(name).exists() {
                return Ok(());
            }
            bail!("no rule to make target `{}`", name);
        };
        // Marking before the descent keeps dependency cycles from
        // recursing forever.
        if !self.done.insert(name.to_string()) {
            return Ok(());
        }

        for dep in &rule.dependencies {
            self.run_target(&dep.display().to_string())?;
        }

        if self.dry_run {
            println!("{}", rule.command.join(" "));
        } else if needs_update(&rule.target, &rule.dependencies)? {
            eprintln!("running rule: {}", name);
            run_command(&rule.command)?;
        } else {
            eprintln!("{} is up to date", name);
        }
        Ok(())
    }
}

fn run_command(command: &[String]) -> Result<()> {
    let Some((program, rest)) = command.split_first() else {
        bail!("rule has an empty command");
    };
    let status = Command::new(program)
        .args(rest)
        .status()
        .with_context(|| format!("failed to run `{}`", command.join(" ")))?;
    if !status.success() {
        bail!("`{}` failed with {}", command.join(" "), status);
    }
    Ok(())
}

/// Run every rule in document order, dependencies first.
pub fn run_rules(rules: &[BuildRule], dry_run: bool) -> Result<()> {
    Runner::new(rules, dry_run).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use conforma_schema::Decoder;
    use conforma_yaml::parse;
    use std::fs;
    use std::time::Duration;

    fn decode_rules(text: &str) -> Vec<BuildRule> {
        let node = parse(text).unwrap();
        let document = Decoder::new()
            .decode(&BuildRule::list_schema(), &node)
            .unwrap();
        BuildRule::from_document(&document).unwrap()
    }

    #[test]
    fn test_decode_rules_fills_default_dependencies() {
        let rules = decode_rules(
            r#"
- target: out/report.txt
  dependencies: [notes.txt]
  command: [cp, notes.txt, out/report.txt]
- target: clean
  command: [rm, -rf, out]
"#,
        );
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].target, PathBuf::from("out/report.txt"));
        assert_eq!(rules[0].dependencies, [PathBuf::from("notes.txt")]);
        assert_eq!(rules[1].dependencies, Vec::<PathBuf>::new());
        assert_eq!(rules[1].command, ["rm", "-rf", "out"]);
    }

    #[test]
    fn test_decode_rules_rejects_missing_command() {
        let node = parse("- target: out.txt").unwrap();
        assert!(
            Decoder::new()
                .decode(&BuildRule::list_schema(), &node)
                .is_err()
        );
    }

    #[test]
    fn test_needs_update_missing_target() {
        assert!(needs_update(Path::new("does-not-exist-xyz"), &[]).unwrap());
    }

    #[test]
    fn test_needs_update_tracks_mtimes() {
        let dir = std::env::temp_dir().join(format!("conforma-rules-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let target = dir.join("target.txt");
        let dep = dir.join("dep.txt");

        fs::write(&target, "out").unwrap();
        // No dependencies: an existing target is up to date.
        assert!(!needs_update(&target, &[]).unwrap());

        std::thread::sleep(Duration::from_millis(20));
        fs::write(&dep, "in").unwrap();
        assert!(needs_update(&target, &[dep.clone()]).unwrap());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_runner_accepts_on_disk_dependencies() {
        // Cargo.toml exists and has no rule; dry run never touches the
        // filesystem beyond existence checks.
        let rules = vec![BuildRule {
            target: PathBuf::from("never-built.txt"),
            dependencies: vec![PathBuf::from("Cargo.toml")],
            command: vec!["true".to_string()],
        }];
        assert!(run_rules(&rules, true).is_ok());
    }

    #[test]
    fn test_runner_rejects_unbuildable_dependency() {
        let rules = vec![BuildRule {
            target: PathBuf::from("never-built.txt"),
            dependencies: vec![PathBuf::from("no-such-file-anywhere")],
            command: vec!["true".to_string()],
        }];
        let err = run_rules(&rules, true).unwrap_err();
        assert!(
            err.to_string()
                .contains("no rule to make target `no-such-file-anywhere`")
        );
    }

    #[test]
    fn test_runner_runs_each_target_once() {
        // `shared` appears both as a rule and as a dependency of two
        // others; the done set must keep the run terminating.
        let rules = vec![
            BuildRule {
                target: PathBuf::from("shared"),
                dependencies: vec![],
                command: vec!["true".to_string()],
            },
            BuildRule {
                target: PathBuf::from("a"),
                dependencies: vec![PathBuf::from("shared")],
                command: vec!["true".to_string()],
            },
            BuildRule {
                target: PathBuf::from("b"),
                dependencies: vec![PathBuf::from("shared")],
                command: vec!["true".to_string()],
            },
        ];
        assert!(run_rules(&rules, true).is_ok());
    }
}
