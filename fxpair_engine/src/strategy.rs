//! Note selection policies.
//!
//! A strategy turns a paired catalog into a lazy stream of picks. Every random
//! draw happens while the stream is pulled, in emission order, so decoding the
//! picks on several threads cannot change the output.

use crate::catalog::{NotePair, PairedCatalog};
use fxpair_shared::scale::{BoxShape, MAX_ROOT_FRET};
use fxpair_shared::{DatasetError, StrategyKind};

/// How much of a decoded note to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteLength {
    /// The whole decoded note.
    Full,
    /// Trim silence from the clean note (same offsets on the effected note),
    /// then keep `trimmed_len / divisor` samples.
    TrimmedFraction { divisor: u8 },
}

/// One chosen note: position in the paired catalog plus the length rule.
#[derive(Debug, Clone, Copy)]
pub struct NotePick<'a> {
    pub index: usize,
    pub pair: &'a NotePair,
    pub length: NoteLength,
}

/// Sizes a strategy needs to plan its picks, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionContext {
    pub target_len: usize,
    /// Nominal length of one catalog note.
    pub note_len: usize,
}

pub type PickStream<'a> = Box<dyn Iterator<Item = NotePick<'a>> + 'a>;

pub trait SelectionStrategy {
    fn kind(&self) -> StrategyKind;

    /// Builds the pick stream. Takes ownership of the random source.
    fn picks<'a>(
        &self,
        catalog: &'a PairedCatalog,
        ctx: &SelectionContext,
        rng: fastrand::Rng,
    ) -> Result<PickStream<'a>, DatasetError>;
}

pub fn strategy_for(kind: StrategyKind) -> Box<dyn SelectionStrategy> {
    match kind {
        StrategyKind::Scale => Box::new(ScaleRun),
        StrategyKind::Random => Box::new(RandomNotes),
        StrategyKind::Pentatonic => Box::new(PentatonicBox::default()),
    }
}

fn require_notes(catalog: &PairedCatalog, kind: StrategyKind) -> Result<(), DatasetError> {
    if catalog.is_empty() {
        return Err(DatasetError::insufficient(
            format!("{} strategy on genre '{}'", kind, catalog.effect.genre),
            1,
            0,
        ));
    }
    Ok(())
}

/// Contiguous run of notes in catalog order from one random start.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleRun;

impl ScaleRun {
    /// Highest start index that still leaves enough notes for the target,
    /// clamped to 0 when the catalog is too small.
    pub fn max_start(len: usize, ctx: &SelectionContext) -> usize {
        let needed = ctx.target_len.div_ceil(ctx.note_len.max(1));
        if needed > len {
            log::warn!(
                "[Strategy] Scale needs {} notes but only {} are available; output will fall short",
                needed,
                len
            );
        }
        len.saturating_sub(needed)
    }
}

impl SelectionStrategy for ScaleRun {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Scale
    }

    fn picks<'a>(
        &self,
        catalog: &'a PairedCatalog,
        ctx: &SelectionContext,
        mut rng: fastrand::Rng,
    ) -> Result<PickStream<'a>, DatasetError> {
        require_notes(catalog, self.kind())?;

        let start = rng.usize(0..=Self::max_start(catalog.len(), ctx));
        log::info!("[Strategy] Scale run starting at note {} of {}", start, catalog.len());

        Ok(Box::new(catalog.pairs[start..].iter().enumerate().map(move |(offset, pair)| NotePick {
            index: start + offset,
            pair,
            length: NoteLength::Full,
        })))
    }
}

/// Unbounded stream of uniformly drawn candidates, each with a random length divisor.
pub struct RandomStream<'a> {
    candidates: Vec<(usize, &'a NotePair)>,
    rng: fastrand::Rng,
}

impl<'a> RandomStream<'a> {
    pub fn new(candidates: Vec<(usize, &'a NotePair)>, rng: fastrand::Rng) -> Self {
        Self { candidates, rng }
    }
}

impl<'a> Iterator for RandomStream<'a> {
    type Item = NotePick<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.candidates.is_empty() {
            return None;
        }
        let (index, pair) = self.candidates[self.rng.usize(0..self.candidates.len())];
        let divisor = self.rng.u8(1..=4);
        Some(NotePick {
            index,
            pair,
            length: NoteLength::TrimmedFraction { divisor },
        })
    }
}

/// Uniform random notes over the whole paired catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNotes;

impl SelectionStrategy for RandomNotes {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Random
    }

    fn picks<'a>(
        &self,
        catalog: &'a PairedCatalog,
        _ctx: &SelectionContext,
        rng: fastrand::Rng,
    ) -> Result<PickStream<'a>, DatasetError> {
        require_notes(catalog, self.kind())?;
        let candidates = catalog.pairs.iter().enumerate().collect();
        Ok(Box::new(RandomStream::new(candidates, rng)))
    }
}

/// Random notes restricted to one pentatonic box.
#[derive(Debug, Clone, Copy, Default)]
pub struct PentatonicBox {
    pub shape: BoxShape,
    /// Fixed root fret; drawn from `0..=MAX_ROOT_FRET` when `None`.
    pub root_fret: Option<u8>,
}

impl PentatonicBox {
    pub fn with_root(root_fret: u8) -> Self {
        Self {
            shape: BoxShape::default(),
            root_fret: Some(root_fret),
        }
    }

    /// Pairs whose clean note lies in the box. Clean and effected rows share
    /// their `NoteKey`, so one predicate filters both sides.
    pub fn box_pairs<'a>(&self, catalog: &'a PairedCatalog, root_fret: u8) -> Vec<(usize, &'a NotePair)> {
        catalog
            .pairs
            .iter()
            .enumerate()
            .filter(|(_, pair)| self.shape.contains(pair.key.string, pair.key.fret, root_fret))
            .collect()
    }
}

impl SelectionStrategy for PentatonicBox {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pentatonic
    }

    fn picks<'a>(
        &self,
        catalog: &'a PairedCatalog,
        _ctx: &SelectionContext,
        mut rng: fastrand::Rng,
    ) -> Result<PickStream<'a>, DatasetError> {
        require_notes(catalog, self.kind())?;

        let root_fret = match self.root_fret {
            Some(fret) => fret,
            None => rng.u8(0..=MAX_ROOT_FRET),
        };
        let candidates = self.box_pairs(catalog, root_fret);
        log::info!(
            "[Strategy] Pentatonic box at fret {}: {} of {} notes",
            root_fret,
            candidates.len(),
            catalog.len()
        );

        if candidates.is_empty() {
            return Err(DatasetError::insufficient(
                format!("pentatonic box at fret {}", root_fret),
                1,
                0,
            ));
        }
        Ok(Box::new(RandomStream::new(candidates, rng)))
    }
}
