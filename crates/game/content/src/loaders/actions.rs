//! Action catalog loader.
//!
//! Loads [`ActionConfig`] lists from RON data files and serves them to the
//! players as an [`ActionOracle`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use action_core::{ActionConfig, ActionId, ActionLogic, ActionOracle, EngineConfig};
use action_core::action::ProjectileKind;

use crate::loaders::{LoadResult, read_file};

const LOG_TARGET: &str = "content::actions";

/// Embedded data files, in load order.
const EMBEDDED: &[(&str, &str)] = &[
    ("combat.ron", include_str!("../../data/actions/combat.ron")),
    ("utility.ron", include_str!("../../data/actions/utility.ron")),
];

/// Read-only table of action prototypes.
///
/// Ids must be unique across every file loaded into one catalog; names are
/// indexed for tooling lookups.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    configs: HashMap<ActionId, Arc<ActionConfig>>,
    names: HashMap<String, ActionId>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the catalog shipped with the crate.
    pub fn load_embedded() -> LoadResult<Self> {
        let mut catalog = Self::new();
        for (label, source) in EMBEDDED {
            catalog.extend_from_ron(label, source)?;
        }
        Ok(catalog)
    }

    /// Loads every `*.ron` file directly inside `dir`, in file name order.
    pub fn load_dir(dir: &Path) -> LoadResult<Self> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut catalog = Self::new();
        for path in &paths {
            catalog.load_file(path)?;
        }
        tracing::debug!(
            target: LOG_TARGET,
            dir = %dir.display(),
            files = paths.len(),
            actions = catalog.len(),
            "loaded action catalog"
        );
        Ok(catalog)
    }

    /// Adds the configs of one RON file.
    pub fn load_file(&mut self, path: &Path) -> LoadResult<()> {
        let content = read_file(path)?;
        self.extend_from_ron(&path.display().to_string(), &content)
    }

    /// Parses `source` as a RON list of configs and adds them.
    ///
    /// `label` only appears in error messages.
    pub fn extend_from_ron(&mut self, label: &str, source: &str) -> LoadResult<()> {
        let configs: Vec<ActionConfig> = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", label, e))?;
        for config in configs {
            self.insert(config)
                .map_err(|e| anyhow::anyhow!("{}: {}", label, e))?;
        }
        Ok(())
    }

    /// Adds one config. Fails on a duplicate id or name.
    pub fn insert(&mut self, config: ActionConfig) -> LoadResult<()> {
        if self.configs.contains_key(&config.id) {
            anyhow::bail!("duplicate action id {}", config.id);
        }
        if !config.name.is_empty() {
            if let Some(existing) = self.names.get(&config.name) {
                anyhow::bail!("action name {:?} already used by {}", config.name, existing);
            }
            self.names.insert(config.name.clone(), config.id);
        }
        self.configs.insert(config.id, Arc::new(config));
        Ok(())
    }

    pub fn get(&self, id: ActionId) -> Option<&ActionConfig> {
        self.configs.get(&id).map(Arc::as_ref)
    }

    pub fn by_name(&self, name: &str) -> Option<&ActionConfig> {
        self.names.get(name).and_then(|id| self.get(*id))
    }

    /// All ids, sorted.
    pub fn ids(&self) -> Vec<ActionId> {
        let mut ids: Vec<_> = self.configs.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Checks the catalog against the engine config.
    ///
    /// Every prototype the engine synthesizes must exist with the matching
    /// logic, interrupter lists must name known actions, and projectile
    /// variants must carry a flyable projectile. All problems are reported
    /// together.
    pub fn validate(&self, engine: &EngineConfig) -> LoadResult<()> {
        let mut problems = Vec::new();

        let prototypes = [
            ("chase", engine.prototypes.chase, ActionLogic::Chase),
            ("target", engine.prototypes.target, ActionLogic::Target),
            ("stunned", engine.prototypes.stunned, ActionLogic::Stunned),
        ];
        for (role, id, logic) in prototypes {
            let Some(id) = id else { continue };
            match self.get(id) {
                None => problems.push(format!("{role} prototype {id} is not in the catalog")),
                Some(config) if config.logic != logic => problems.push(format!(
                    "{role} prototype {id} has logic {}, expected {logic}",
                    config.logic
                )),
                Some(_) => {}
            }
        }

        for id in self.ids() {
            let Some(config) = self.get(id) else { continue };
            for interrupter in &config.interrupted_by {
                if !self.configs.contains_key(interrupter) {
                    problems.push(format!("{id} lists unknown interrupter {interrupter}"));
                }
            }
            if let Some(problem) = projectile_problem(config) {
                problems.push(format!("{id} ({}): {problem}", config.name));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("invalid action catalog:\n  {}", problems.join("\n  "))
        }
    }
}

fn projectile_problem(config: &ActionConfig) -> Option<&'static str> {
    let required = match config.logic {
        ActionLogic::LaunchProjectile | ActionLogic::ChargedLaunchProjectile | ActionLogic::Toss => {
            config.projectile(ProjectileKind::Physical)
        }
        ActionLogic::RangedFxTargeted => config.projectiles.first(),
        _ => return None,
    };
    match required {
        None => Some("no usable projectile"),
        Some(info) if info.speed <= 0.0 => Some("projectile speed must be positive"),
        Some(_) => None,
    }
}

impl ActionOracle for ActionCatalog {
    fn action_config(&self, id: ActionId) -> Option<Arc<ActionConfig>> {
        self.configs.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use action_core::PrototypeIds;
    use action_core::action::BlockingMode;

    use super::*;
    use crate::ConfigLoader;

    #[test]
    fn embedded_catalog_validates_against_embedded_config() {
        let catalog = ActionCatalog::load_embedded().expect("embedded catalog");
        let engine = ConfigLoader::embedded().expect("embedded config");

        catalog.validate(&engine).expect("consistent content");
        assert!(catalog.len() >= 15);

        let slash = catalog.by_name("slash").expect("slash is shipped");
        assert_eq!(slash.logic, ActionLogic::Melee);
        assert_eq!(slash.react_anim, "HitReact");

        let shield = catalog.get(ActionId(20)).unwrap();
        assert_eq!(shield.blocking_mode, BlockingMode::OnlyDuringExecTime);
        assert!(shield.is_blocking());
        assert!(!catalog.get(ActionId(101)).unwrap().is_blocking());
    }

    #[test]
    fn oracle_shares_configs() {
        let catalog = ActionCatalog::load_embedded().unwrap();
        let a = catalog.action_config(ActionId(1)).unwrap();
        let b = catalog.action_config(ActionId(1)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(catalog.action_config(ActionId(999)).is_none());
    }

    #[test]
    fn load_dir_reads_ron_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("b.ron"),
            r#"[(id: (2), name: "kick", logic: Melee, range: 2.0)]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("a.ron"),
            r#"[(id: (1), name: "wave", logic: Emote, anim: "Wave")]"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not content").unwrap();

        let catalog = ActionCatalog::load_dir(dir.path()).unwrap();

        assert_eq!(catalog.ids(), vec![ActionId(1), ActionId(2)]);
        assert_eq!(catalog.by_name("kick").unwrap().range, 2.0);
        assert_eq!(catalog.get(ActionId(1)).unwrap().anim, "Wave");
    }

    #[test]
    fn duplicate_ids_across_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ron"), r#"[(id: (1), name: "a")]"#).unwrap();
        fs::write(dir.path().join("b.ron"), r#"[(id: (1), name: "b")]"#).unwrap();

        let err = ActionCatalog::load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate action id"));
    }

    #[test]
    fn malformed_ron_names_the_file() {
        let mut catalog = ActionCatalog::new();
        let err = catalog.extend_from_ron("broken.ron", "[(id: ").unwrap_err();
        assert!(err.to_string().contains("broken.ron"));
    }

    #[test]
    fn validate_collects_every_problem() {
        let mut catalog = ActionCatalog::new();
        catalog
            .extend_from_ron(
                "bad.ron",
                r#"[
                    (id: (1), name: "arrow", logic: LaunchProjectile),
                    (id: (2), name: "beam", logic: RangedFxTargeted,
                     projectiles: [(name: "b", kind: Fx, speed: 0.0)]),
                    (id: (3), name: "not_a_chase", logic: Emote, interrupted_by: [(9)]),
                ]"#,
            )
            .unwrap();
        let engine = EngineConfig::default().with_prototypes(PrototypeIds {
            chase: Some(ActionId(3)),
            target: Some(ActionId(4)),
            stunned: None,
        });

        let message = catalog.validate(&engine).unwrap_err().to_string();

        assert!(message.contains("chase prototype action:3 has logic emote"));
        assert!(message.contains("target prototype action:4 is not in the catalog"));
        assert!(message.contains("unknown interrupter action:9"));
        assert!(message.contains("no usable projectile"));
        assert!(message.contains("speed must be positive"));
    }
}
