//! Feat transformer.
//!
//! Selects every catalog feat that depends on a multiclass dedication, directly
//! or through a bounded chain of other selected feats, clones it into the
//! working feat collection and re-links its prerequisites to the True
//! Archetype names.

use indexmap::{IndexMap, IndexSet};

use crate::core::config::TrueArchetypeConfig;
use crate::core::dedication::{self, DedicationMapping, ARCHETYPE_TRAIT, TRUE_ARCHETYPE_TRAIT};
use crate::core::error::AppError;
use crate::core::item::ItemDocument;
use crate::core::matching::{best_mention, mentions_lowered};
use crate::core::rule_splice::{splice_class_feat_choice, SpliceOutcome};
use crate::core::store::{DocumentStore, IndexEntry, SettingsStore};
use crate::core::working::{
    fetch_documents, parse_key, prepare_working_collection, require_collection,
};

pub const NAME_PREFIX: &str = "True ";
pub const SLUG_PREFIX: &str = "true-";
pub const CATEGORY: &str = "truearchetypefeat";
pub const WORKING_LABEL: &str = "Temporary True Archetype Feats";

const INDEX_FIELDS: [&str; 3] = ["system.prerequisites.value", "name", "system.slug"];

/// `2 * ceil(level / 4)`: levels 1-4 -> 2, 5-8 -> 4, ..., 17-20 -> 10.
pub fn compress_level(level: i64) -> i64 {
    2 * (level + 3).div_euclid(4)
}

pub fn true_feat_name(name: &str) -> String {
    format!("{}{}", NAME_PREFIX, name)
}

/// One index read of the source catalog, keyed by document id.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: IndexMap<String, IndexEntry>,
    prerequisites: IndexMap<String, Vec<String>>,
}

/// Selected ids in selection order plus how many joined in each round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub ids: IndexSet<String>,
    pub added_per_round: Vec<usize>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

impl CatalogIndex {
    pub fn new(index: Vec<IndexEntry>) -> Self {
        let mut entries = IndexMap::with_capacity(index.len());
        let mut prerequisites = IndexMap::with_capacity(index.len());
        for entry in index {
            let lowered = entry
                .prerequisites()
                .into_iter()
                .map(str::to_lowercase)
                .collect();
            prerequisites.insert(entry.id.clone(), lowered);
            entries.insert(entry.id.clone(), entry);
        }
        Self {
            entries,
            prerequisites,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|entry| entry.name.as_str())
    }

    /// Names of the mapped dedications that are present in the catalog.
    pub fn dedication_names(&self, mapping: &DedicationMapping) -> Vec<String> {
        mapping
            .original_ids()
            .filter_map(|id| self.name(id))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Seed with items naming a dedication, then run at most `max_extra_hops`
    /// propagation rounds. Each round only sees the selection as it stood when
    /// the round started, so an item joins at hop `n` only through an item
    /// that joined at hop `n - 1` or earlier.
    pub fn select(&self, dedication_names: &[String], max_extra_hops: usize) -> Selection {
        let dedications: Vec<String> = dedication_names
            .iter()
            .map(|name| name.to_lowercase())
            .collect();

        let mut selected: IndexSet<String> = self
            .prerequisites
            .iter()
            .filter(|(_, lines)| any_mention(lines, &dedications))
            .map(|(id, _)| id.clone())
            .collect();
        let mut added_per_round = vec![selected.len()];

        for _ in 0..max_extra_hops {
            let selected_names: Vec<String> = selected
                .iter()
                .filter_map(|id| self.name(id))
                .map(str::to_lowercase)
                .collect();

            let added: Vec<String> = self
                .prerequisites
                .iter()
                .filter(|(id, _)| !selected.contains(*id))
                .filter(|(_, lines)| any_mention(lines, &selected_names))
                .map(|(id, _)| id.clone())
                .collect();

            if added.is_empty() {
                break;
            }
            added_per_round.push(added.len());
            selected.extend(added);
        }

        Selection {
            ids: selected,
            added_per_round,
        }
    }
}

fn any_mention(lines: &[String], names_lower: &[String]) -> bool {
    lines
        .iter()
        .any(|line| names_lower.iter().any(|name| mentions_lowered(line, name)))
}

/// Lookup tables shared by every per-feat rewrite of one run.
#[derive(Debug, Clone, Default)]
pub struct RewriteContext {
    /// Original dedication name -> "True Archetype: <Class>".
    pub dedications: IndexMap<String, String>,
    /// Original feat name -> "True <name>".
    pub feats: IndexMap<String, String>,
    /// Original feat name -> source document, for rule splicing.
    pub sources: IndexMap<String, ItemDocument>,
}

impl RewriteContext {
    pub fn new<'a>(
        dedication_names: impl IntoIterator<Item = &'a str>,
        selected: impl IntoIterator<Item = ItemDocument>,
    ) -> Self {
        let dedications = dedication_names
            .into_iter()
            .map(|name| (name.to_string(), dedication::true_archetype_name(name)))
            .collect();
        let mut feats = IndexMap::new();
        let mut sources = IndexMap::new();
        for doc in selected {
            feats.insert(doc.name.clone(), true_feat_name(&doc.name));
            sources.insert(doc.name.clone(), doc);
        }
        Self {
            dedications,
            feats,
            sources,
        }
    }

    /// New text for one prerequisite line, `None` to keep it.
    ///
    /// Dedication references win over feat references; within each kind the
    /// longest mentioned name wins.
    pub fn rewrite_prerequisite(&self, text: &str) -> Option<String> {
        let by_name = |map: &IndexMap<String, String>| {
            best_mention(
                text,
                map.iter().map(|(original, renamed)| (original.as_str(), renamed)),
            )
            .cloned()
        };
        by_name(&self.dedications).or_else(|| by_name(&self.feats))
    }
}

/// Rewrite one cloned feat in place from its catalog original.
pub fn rewrite_feat(
    doc: &mut ItemDocument,
    original: &ItemDocument,
    context: &RewriteContext,
) -> SpliceOutcome {
    let new_name = true_feat_name(&original.name);
    let outcome = splice_class_feat_choice(doc, &new_name, &context.sources);

    for prerequisite in doc.system.prerequisites.value.iter_mut() {
        if let Some(rewritten) = context.rewrite_prerequisite(&prerequisite.value) {
            prerequisite.value = rewritten;
        }
    }

    let original_slug = match original.slug() {
        "" => dedication::slugify(&original.name),
        slug => slug.to_string(),
    };
    doc.name = new_name;
    doc.system.slug = Some(format!("{}{}", SLUG_PREFIX, original_slug));
    doc.system.category = Some(CATEGORY.to_string());
    doc.system.level.value = compress_level(original.level());
    doc.retag(&[ARCHETYPE_TRAIT], &[TRUE_ARCHETYPE_TRAIT]);

    outcome
}

/// Result of one feat run.
#[derive(Debug, Clone)]
pub struct FeatRun {
    pub selection: Selection,
    pub imported: usize,
    pub spliced: usize,
}

/// Rebuild the working feat collection from the source catalog.
pub async fn regenerate(
    documents: &dyn DocumentStore,
    settings: &dyn SettingsStore,
    config: &TrueArchetypeConfig,
) -> Result<FeatRun, AppError> {
    let source = parse_key(&config.collections.source)?;
    let working = parse_key(&config.collections.working_feats)?;

    require_collection(documents, &source).await?;
    let mapping = DedicationMapping::load(settings, &config.settings)
        .await?
        .filter(|mapping| !mapping.is_empty())
        .ok_or_else(|| {
            AppError::missing_precondition(
                "No dedication map found. Run regenerate-dedications first.",
                "true-archetype regenerate-dedications",
            )
        })?;
    prepare_working_collection(documents, &working, WORKING_LABEL).await?;

    let catalog = CatalogIndex::new(documents.get_index(&source, &INDEX_FIELDS).await?);
    let dedication_names = catalog.dedication_names(&mapping);
    if dedication_names.len() < mapping.len() {
        tracing::warn!(
            mapped = mapping.len(),
            found = dedication_names.len(),
            "some mapped dedications are no longer in the catalog"
        );
    }

    let selection = catalog.select(&dedication_names, config.selection.max_extra_hops);
    tracing::info!(
        selected = selection.len(),
        rounds = ?selection.added_per_round,
        "Identified feats to import"
    );

    let originals = fetch_documents(documents, &source, &selection.ids).await?;
    let context = RewriteContext::new(
        dedication_names.iter().map(String::as_str),
        originals.iter().cloned(),
    );

    let mut clones = documents.import_documents(&working, &originals).await?;
    let mut spliced = 0;
    for (clone, original) in clones.iter_mut().zip(&originals) {
        if let SpliceOutcome::Spliced { prerequisite } = rewrite_feat(clone, original, &context) {
            spliced += 1;
            tracing::debug!(feat = %clone.name, from = %prerequisite, "spliced class feat grant");
        }
    }
    documents.update_documents(&working, &clones).await?;

    Ok(FeatRun {
        imported: originals.len(),
        selection,
        spliced,
    })
}
