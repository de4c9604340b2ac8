use fxpair_shared::{
    CatalogRow, DatasetError, EffectDescriptor, NoteKey, NO_EFFECT_FX_TYPE, PICKING_PLAY_STYLE,
    REFERENCE_INSTRUMENT,
};
use std::collections::HashMap;
use std::path::Path;

/// Read-only note and effect tables produced by the metadata extraction step.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub notes: Vec<CatalogRow>,
    pub effects: Vec<EffectDescriptor>,
}

impl Catalog {
    pub fn new(notes: Vec<CatalogRow>, effects: Vec<EffectDescriptor>) -> Self {
        Self { notes, effects }
    }

    pub fn load(file_catalog: &Path, effect_catalog: &Path) -> Result<Self, anyhow::Error> {
        let notes = load_file_catalog(file_catalog)?;
        let effects = load_effect_catalog(effect_catalog)?;
        log::info!(
            "[Catalog] Loaded {} notes and {} effect settings",
            notes.len(),
            effects.len()
        );
        Ok(Self { notes, effects })
    }

    /// First effect setting whose genre matches exactly.
    pub fn find_effect(&self, genre: &str) -> Result<&EffectDescriptor, DatasetError> {
        self.effects
            .iter()
            .find(|fx| fx.genre == genre)
            .ok_or_else(|| DatasetError::NotFound { genre: genre.to_string() })
    }
}

pub fn load_file_catalog(path: &Path) -> Result<Vec<CatalogRow>, anyhow::Error> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file catalog {}: {}", path.display(), e))?;
    let rows: Vec<CatalogRow> = serde_json::from_str(&content)?;
    Ok(rows)
}

pub fn load_effect_catalog(path: &Path) -> Result<Vec<EffectDescriptor>, anyhow::Error> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read effect catalog {}: {}", path.display(), e))?;
    let effects: Vec<EffectDescriptor> = serde_json::from_str(&content)?;
    Ok(effects)
}

/// A dry recording and its effected counterpart of the same performed note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePair {
    pub key: NoteKey,
    pub clean: CatalogRow,
    pub effect: CatalogRow,
}

/// Clean/effect pairs for one effect setting, in clean-table source order.
#[derive(Debug, Clone)]
pub struct PairedCatalog {
    pub effect: EffectDescriptor,
    pub pairs: Vec<NotePair>,
    /// Clean rows that found no effected partner.
    pub unmatched: usize,
}

impl PairedCatalog {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn is_reference_pick(row: &CatalogRow) -> bool {
    row.play_style == PICKING_PLAY_STYLE && row.instrument_setting == REFERENCE_INSTRUMENT
}

/// Narrows the catalog to the picked reference-guitar notes for `genre` and
/// pairs every dry note with its effected recording.
pub fn filter_catalog(genre: &str, catalog: &Catalog) -> Result<PairedCatalog, DatasetError> {
    let effect = catalog.find_effect(genre)?;

    let effect_rows: Vec<&CatalogRow> = catalog
        .notes
        .iter()
        .filter(|row| {
            is_reference_pick(row)
                && row.fx_type == effect.fx_type_id
                && row.fx_setting == effect.fx_setting_id
        })
        .collect();

    let clean_rows: Vec<&CatalogRow> = catalog
        .notes
        .iter()
        .filter(|row| is_reference_pick(row) && row.fx_type == NO_EFFECT_FX_TYPE)
        .collect();

    let (pairs, unmatched) = pair_rows(&clean_rows, &effect_rows);

    log::info!(
        "[Catalog] Genre '{}' -> {}/{} (type {}, setting {}): {} clean, {} effected, {} paired",
        genre,
        effect.effect_folder,
        effect.fx_setting_name.as_deref().unwrap_or("-"),
        effect.fx_type_id,
        effect.fx_setting_id,
        clean_rows.len(),
        effect_rows.len(),
        pairs.len()
    );
    if unmatched > 0 {
        log::warn!("[Catalog] {} clean notes have no effected recording", unmatched);
    }

    Ok(PairedCatalog {
        effect: effect.clone(),
        pairs,
        unmatched,
    })
}

/// Assigns each row its note identity. Rows without an explicit take are
/// numbered by occurrence of their (string, fret) in source order.
pub fn note_keys(rows: &[&CatalogRow]) -> Vec<NoteKey> {
    let mut seen: HashMap<(u8, u8), u32> = HashMap::new();
    rows.iter()
        .map(|row| {
            let counter = seen.entry((row.string, row.fret)).or_insert(0);
            let take = row.take.unwrap_or(*counter);
            *counter += 1;
            NoteKey {
                string: row.string,
                fret: row.fret,
                take,
            }
        })
        .collect()
}

/// Joins clean and effect rows on `NoteKey`. Output follows clean order; the
/// first effect row per key wins. Returns the pairs and the unmatched count.
pub fn pair_rows(clean_rows: &[&CatalogRow], effect_rows: &[&CatalogRow]) -> (Vec<NotePair>, usize) {
    let mut by_key: HashMap<NoteKey, &CatalogRow> = HashMap::with_capacity(effect_rows.len());
    for (key, row) in note_keys(effect_rows).into_iter().zip(effect_rows.iter()) {
        by_key.entry(key).or_insert(*row);
    }

    let mut pairs = Vec::with_capacity(clean_rows.len());
    let mut unmatched = 0;
    for (key, clean) in note_keys(clean_rows).into_iter().zip(clean_rows.iter()) {
        match by_key.remove(&key) {
            Some(effect) => pairs.push(NotePair {
                key,
                clean: (*clean).clone(),
                effect: effect.clone(),
            }),
            None => {
                log::debug!("[Catalog] No effected take for {} ({:?})", clean.file_id, key);
                unmatched += 1;
            }
        }
    }

    (pairs, unmatched)
}
