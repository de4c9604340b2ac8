#[cfg(test)]
mod tests {
    use crate::assets::{MemoryDecoder, SampleLayout};
    use crate::catalog::{filter_catalog, Catalog};
    use crate::companding::mu_compress_sample;
    use crate::strategy::{PentatonicBox, SelectionContext, SelectionStrategy};
    use crate::{create_dataset, create_dataset_with_rng};
    use fxpair_shared::{
        AudioBuffer, CatalogRow, DatasetError, DatasetRequest, DecodeFailurePolicy, EffectDescriptor,
        StrategyKind, NO_EFFECT_FX_TYPE,
    };
    use std::ops::RangeInclusive;

    const FRETS: u8 = 12;

    struct Fixture {
        catalog: Catalog,
        layout: SampleLayout,
        decoder: MemoryDecoder,
        rate: u32,
    }

    fn level(string: u8, fret: u8) -> f32 {
        0.05 + 0.01 * ((string - 1) as f32 * (FRETS + 1) as f32 + fret as f32)
    }

    fn note_samples(rate: u32, level: f32) -> Vec<f32> {
        let silence = (rate / 10) as usize;
        let body = 2 * rate as usize - 2 * silence;
        let mut samples = vec![0.0; silence];
        samples.extend(std::iter::repeat(level).take(body));
        samples.extend(std::iter::repeat(0.0).take(silence));
        samples
    }

    fn row(file_id: String, fx_type: u32, fx_setting: u32, string: u8, fret: u8) -> CatalogRow {
        CatalogRow {
            file_id,
            play_style: 3,
            instrument_setting: 9,
            fx_type,
            fx_setting,
            string,
            fret,
            midi: None,
            take: None,
        }
    }

    fn descriptor(genre: &str, folder: &str, fx_type_id: u32, fx_setting_id: u32) -> EffectDescriptor {
        EffectDescriptor {
            genre: genre.to_string(),
            effect_folder: folder.to_string(),
            fx_type_id,
            fx_setting_name: None,
            fx_setting_id,
        }
    }

    impl Fixture {
        /// Every fret 0..=12 on the given strings, recorded dry, with
        /// "Classic Rock" (32/1) and with "Metal" (41/3). Effected notes are
        /// the dry note scaled by -0.5.
        fn new(rate: u32, strings: RangeInclusive<u8>) -> Self {
            let layout = SampleLayout::new("samples");
            let mut decoder = MemoryDecoder::new();
            let mut notes = Vec::new();
            let effects = [("Overdrive", 32, 1), ("Distortion", 41, 3)];

            for string in strings {
                for fret in 0..=FRETS {
                    let dry = note_samples(rate, level(string, fret));
                    let wet: Vec<f32> = dry.iter().map(|s| -0.5 * s).collect();

                    let clean = row(format!("dry-{}-{}", string, fret), NO_EFFECT_FX_TYPE, 1, string, fret);
                    decoder.insert(layout.clean_path(&clean), AudioBuffer::from_samples(rate, dry));
                    notes.push(clean);

                    for (folder, fx_type, fx_setting) in effects {
                        let effect = row(format!("{}-{}-{}", folder, string, fret), fx_type, fx_setting, string, fret);
                        decoder.insert(layout.note_path(folder, &effect), AudioBuffer::from_samples(rate, wet.clone()));
                        notes.push(effect);
                    }

                    let mut bass = row(format!("bass-{}-{}", string, fret), NO_EFFECT_FX_TYPE, 1, string, fret);
                    bass.instrument_setting = 4;
                    notes.push(bass);
                }
            }

            let catalog = Catalog::new(
                notes,
                vec![
                    descriptor("Classic Rock", "Overdrive", 32, 1),
                    descriptor("Metal", "Distortion", 41, 3),
                    descriptor("Country", "Chorus", 22, 1),
                ],
            );
            Self { catalog, layout, decoder, rate }
        }

        fn request(&self, genre: &str, kind: StrategyKind, seconds: f64) -> DatasetRequest {
            let mut request = DatasetRequest::new(genre, kind);
            request.sample_rate = self.rate;
            request.duration_seconds = seconds;
            request.apply_companding = false;
            request.seed = Some(1234);
            request
        }
    }

    fn assert_aligned(clean: &[f32], effect: &[f32]) {
        assert_eq!(clean.len(), effect.len());
        for (i, (c, e)) in clean.iter().zip(effect).enumerate() {
            assert!((e + 0.5 * c).abs() < 1e-6, "misaligned at sample {}: {} vs {}", i, c, e);
        }
    }

    #[test]
    fn test_strategy_conformance() {
        let fx = Fixture::new(1000, 1..=6);
        for kind in StrategyKind::ALL {
            let request = fx.request("Metal", kind, 10.0);
            let out = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);

            assert!(out.diagnostics.is_empty(), "{}: {:?}", kind, out.diagnostics);
            assert_eq!(out.strategy, Some(kind));
            assert_eq!(out.clean.len(), 10_000, "{}", kind);
            assert_eq!(out.effect.len(), 10_000, "{}", kind);
            assert_eq!(out.shortfall, 0);
            assert_eq!(out.clean.sample_rate, 1000);
            assert_aligned(&out.clean.samples, &out.effect.samples);

            let again = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);
            assert_eq!(again.clean.samples, out.clean.samples, "{} not reproducible", kind);
            assert_eq!(again.effect.samples, out.effect.samples);
        }
    }

    #[test]
    fn test_classic_rock_scale_is_contiguous_run() {
        let fx = Fixture::new(22050, 1..=1);
        let request = fx.request("Classic Rock", StrategyKind::Scale, 10.0);
        let out = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);

        assert!(out.diagnostics.is_empty());
        assert_eq!(out.clean.len(), 220_500);
        assert_eq!(out.effect.len(), 220_500);
        assert_aligned(&out.clean.samples, &out.effect.samples);

        let note_len = 44_100;
        let levels: Vec<f32> = (0..5).map(|k| out.clean.samples[k * note_len + note_len / 2]).collect();
        let start_fret = ((levels[0] - 0.05) / 0.01).round() as u8;
        assert!(start_fret + 4 <= FRETS);
        for (k, lvl) in levels.iter().enumerate() {
            assert!((lvl - level(1, start_fret + k as u8)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_scale_seed_changes_start() {
        let fx = Fixture::new(1000, 1..=6);
        let mut starts = std::collections::HashSet::new();
        for seed in 0..10 {
            let mut request = fx.request("Classic Rock", StrategyKind::Scale, 4.0);
            request.seed = Some(seed);
            let out = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);
            starts.insert(out.clean.samples[1000].to_bits());
        }
        assert!(starts.len() > 1);
    }

    #[test]
    fn test_unknown_genre_returns_empty_buffers() {
        let fx = Fixture::new(1000, 1..=1);
        let request = fx.request("Jazz Fusion", StrategyKind::Scale, 10.0);
        let out = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);

        assert!(out.is_empty());
        assert!(out.effect.is_empty());
        assert_eq!(out.strategy, None);
        assert_eq!(out.diagnostics, vec![DatasetError::NotFound { genre: "Jazz Fusion".into() }]);
    }

    #[test]
    fn test_unknown_strategy_reported() {
        let fx = Fixture::new(1000, 1..=1);
        let mut request = fx.request("Metal", StrategyKind::Scale, 10.0);
        request.strategy_type = "arpeggio".into();
        let out = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);

        assert!(out.is_empty());
        assert!(matches!(out.diagnostics[..], [DatasetError::UnsupportedOption(_)]));
    }

    #[test]
    fn test_polyphonic_flag_ignored_with_diagnostic() {
        let fx = Fixture::new(1000, 1..=2);
        let mut request = fx.request("Metal", StrategyKind::Random, 5.0);
        request.include_polyphonic = true;
        let out = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);

        assert_eq!(out.clean.len(), 5000);
        assert!(matches!(out.diagnostics[..], [DatasetError::UnsupportedOption(_)]));
    }

    #[test]
    fn test_genre_without_notes_is_insufficient() {
        let fx = Fixture::new(1000, 1..=1);
        for kind in StrategyKind::ALL {
            let request = fx.request("Country", kind, 5.0);
            let out = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);
            assert!(out.is_empty());
            assert!(matches!(out.diagnostics[..], [DatasetError::InsufficientData { .. }]), "{}", kind);
        }
    }

    #[test]
    fn test_scale_shortfall_when_catalog_exhausted() {
        let fx = Fixture::new(1000, 1..=1);
        let request = fx.request("Metal", StrategyKind::Scale, 60.0);
        let out = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);

        assert!(out.diagnostics.is_empty());
        assert_eq!(out.clean.len(), 13 * 2000);
        assert_eq!(out.effect.len(), 13 * 2000);
        assert_eq!(out.shortfall, 60_000 - 26_000);
        assert_aligned(&out.clean.samples, &out.effect.samples);
    }

    #[test]
    fn test_huge_duration_on_single_note_reports_shortfall() {
        let rate = 1000;
        let layout = SampleLayout::new("samples");
        let mut decoder = MemoryDecoder::new();
        let dry = note_samples(rate, 0.4);
        let wet: Vec<f32> = dry.iter().map(|s| -0.5 * s).collect();

        let clean = row("dry-1-0".into(), NO_EFFECT_FX_TYPE, 1, 1, 0);
        let effect = row("Distortion-1-0".into(), 41, 3, 1, 0);
        decoder.insert(layout.clean_path(&clean), AudioBuffer::from_samples(rate, dry));
        decoder.insert(layout.note_path("Distortion", &effect), AudioBuffer::from_samples(rate, wet));
        let catalog = Catalog::new(vec![clean, effect], vec![descriptor("Metal", "Distortion", 41, 3)]);

        let mut request = DatasetRequest::new("Metal", StrategyKind::Scale);
        request.sample_rate = rate;
        request.duration_seconds = 1.0e9;
        request.apply_companding = false;
        request.seed = Some(7);

        let out = create_dataset(&request, &catalog, &layout, &decoder);
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        assert_eq!(out.clean.len(), 2000);
        assert_eq!(out.effect.len(), 2000);
        assert_eq!(out.target_len, 1_000_000_000_000);
        assert_eq!(out.shortfall, 1_000_000_000_000 - 2000);
        assert_aligned(&out.clean.samples, &out.effect.samples);
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let fx = Fixture::new(1000, 1..=1);
        for seconds in [f64::INFINITY, f64::NAN, -1.0] {
            let request = fx.request("Metal", StrategyKind::Scale, seconds);
            let out = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);

            assert!(out.is_empty());
            assert!(out.effect.is_empty());
            assert_eq!(out.strategy, None);
            assert!(
                matches!(out.diagnostics.as_slice(), [DatasetError::UnsupportedOption(msg)] if msg.contains("durationSeconds")),
                "{}: {:?}",
                seconds,
                out.diagnostics
            );
        }
    }

    #[test]
    fn test_companding_applied_to_both_streams() {
        let fx = Fixture::new(1000, 1..=3);
        let raw_request = fx.request("Metal", StrategyKind::Random, 6.0);
        let mut mu_request = raw_request.clone();
        mu_request.apply_companding = true;

        let raw = create_dataset(&raw_request, &fx.catalog, &fx.layout, &fx.decoder);
        let mu = create_dataset(&mu_request, &fx.catalog, &fx.layout, &fx.decoder);

        assert_eq!(raw.clean.len(), mu.clean.len());
        for (r, m) in raw.clean.samples.iter().zip(&mu.clean.samples) {
            assert_eq!(mu_compress_sample(*r), *m);
        }
        for (r, m) in raw.effect.samples.iter().zip(&mu.effect.samples) {
            assert_eq!(mu_compress_sample(*r), *m);
        }
        assert!(mu.clean.samples.iter().chain(&mu.effect.samples).all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_decode_failure_skip_and_abort() {
        let mut fx = Fixture::new(1000, 1..=1);
        // Effected Metal recordings above fret 5 are missing.
        let mut decoder = MemoryDecoder::new();
        for row in &fx.catalog.notes {
            let dry = note_samples(1000, level(1, row.fret));
            if row.fx_type == NO_EFFECT_FX_TYPE && row.instrument_setting == 9 {
                decoder.insert(fx.layout.clean_path(row), AudioBuffer::from_samples(1000, dry));
            } else if row.fx_type == 41 && row.fret <= 5 {
                let wet: Vec<f32> = dry.iter().map(|s| -0.5 * s).collect();
                decoder.insert(fx.layout.note_path("Distortion", row), AudioBuffer::from_samples(1000, wet));
            }
        }
        fx.decoder = decoder;

        let skip = fx.request("Metal", StrategyKind::Random, 3.0);
        let out = create_dataset(&skip, &fx.catalog, &fx.layout, &fx.decoder);
        assert_eq!(out.clean.len(), 3000);
        assert_aligned(&out.clean.samples, &out.effect.samples);
        assert!(out.diagnostics.iter().all(|d| matches!(d, DatasetError::Decode { .. })));
        assert!(!out.diagnostics.is_empty());

        let mut abort = skip.clone();
        abort.strategy_type = "scale".into();
        abort.decode_failure_policy = DecodeFailurePolicy::Abort;
        abort.duration_seconds = 26.0;
        let out = create_dataset(&abort, &fx.catalog, &fx.layout, &fx.decoder);
        assert!(out.is_empty());
        assert!(matches!(out.diagnostics[..], [DatasetError::Decode { .. }]));
    }

    #[test]
    fn test_random_over_missing_files_terminates() {
        let mut fx = Fixture::new(1000, 1..=1);
        fx.decoder = MemoryDecoder::new();
        let request = fx.request("Metal", StrategyKind::Random, 5.0);
        let out = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);

        assert!(out.is_empty());
        assert_eq!(out.shortfall, 5000);
        assert!(matches!(
            out.diagnostics.last(),
            Some(DatasetError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_metal_pentatonic_root_zero() {
        let fx = Fixture::new(1000, 1..=6);
        let paired = filter_catalog("Metal", &fx.catalog).unwrap();
        let strategy = PentatonicBox::with_root(0);

        let boxed = strategy.box_pairs(&paired, 0);
        assert_eq!(boxed.len(), 12);
        assert!(boxed.iter().all(|(_, p)| [0, 2, 3].contains(&p.clean.fret)));
        assert!(boxed.iter().all(|(_, p)| p.effect.file_id.starts_with("Distortion-")));

        let ctx = SelectionContext { target_len: 5000, note_len: 2000 };
        let picks: Vec<_> = strategy
            .picks(&paired, &ctx, fastrand::Rng::with_seed(8))
            .unwrap()
            .take(100)
            .collect();
        assert!(picks.iter().all(|p| boxed.iter().any(|(i, _)| *i == p.index)));
    }

    #[test]
    fn test_explicit_rng_matches_seed() {
        let fx = Fixture::new(1000, 1..=2);
        let request = fx.request("Classic Rock", StrategyKind::Pentatonic, 4.0);
        let seeded = create_dataset(&request, &fx.catalog, &fx.layout, &fx.decoder);
        let explicit =
            create_dataset_with_rng(&request, &fx.catalog, &fx.layout, &fx.decoder, fastrand::Rng::with_seed(1234));
        assert_eq!(seeded.clean.samples, explicit.clean.samples);
    }

    #[test]
    fn test_summary_reports_lengths() {
        let fx = Fixture::new(1000, 1..=1);
        let out = create_dataset(&fx.request("Metal", StrategyKind::Scale, 4.0), &fx.catalog, &fx.layout, &fx.decoder);
        let summary = out.summary();
        assert_eq!(summary.strategy.as_deref(), Some("scale"));
        assert_eq!(summary.clean_samples, 4000);
        assert_eq!(summary.target_samples, 4000);
        assert!((summary.seconds - 4.0).abs() < 1e-9);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["cleanSamples"], 4000);
    }
}
