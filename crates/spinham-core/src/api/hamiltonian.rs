//! Boundary functions for reading and reconfiguring an image's energy model.

use super::{IndexLabel, guarded, report};
use crate::core::geometry::Pair;
use crate::engine::{EngineError, SpinImage, State, mutation, query};
use nalgebra::Vector3;
use tracing::warn;

fn mutate<F>(state: &State, idx_image: Option<usize>, idx_chain: Option<usize>, apply: F)
where
    F: FnOnce(&SpinImage) -> Result<crate::engine::MutationOutcome, EngineError>,
{
    guarded(state, idx_image, idx_chain, (), |image| {
        let outcome = apply(image)?;
        report(&outcome, idx_image, idx_chain);
        Ok(())
    });
}

/// Turns the stub result of a pair export into a warning and `default`.
fn unimplemented_export<T>(
    image: &SpinImage,
    result: Result<T, EngineError>,
    default: T,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) -> Result<T, EngineError> {
    match result {
        Err(EngineError::NotImplemented(what)) => {
            warn!(
                idx_image = %IndexLabel(idx_image),
                idx_chain = %IndexLabel(idx_chain),
                "{} Hamiltonian: {} is not yet implemented...",
                query::name(image)?,
                what
            );
            Ok(default)
        }
        other => other,
    }
}

// --- Set parameters ---

pub fn set_boundary_conditions(
    state: &State,
    periodical: [bool; 3],
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) {
    mutate(state, idx_image, idx_chain, |image| {
        mutation::set_boundary_conditions(image, periodical)
    });
}

pub fn set_mu_s(state: &State, mu_s: f64, idx_image: Option<usize>, idx_chain: Option<usize>) {
    mutate(state, idx_image, idx_chain, |image| {
        mutation::set_mu_s(image, mu_s)
    });
}

/// `magnitude` in Tesla.
pub fn set_field(
    state: &State,
    magnitude: f64,
    normal: [f64; 3],
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) {
    mutate(state, idx_image, idx_chain, |image| {
        mutation::set_field(image, magnitude, &Vector3::from(normal))
    });
}

/// `magnitude` in meV.
pub fn set_anisotropy(
    state: &State,
    magnitude: f64,
    normal: [f64; 3],
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) {
    mutate(state, idx_image, idx_chain, |image| {
        mutation::set_anisotropy(image, magnitude, &Vector3::from(normal))
    });
}

pub fn set_exchange(
    state: &State,
    n_shells: usize,
    jij: &[f64],
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) {
    mutate(state, idx_image, idx_chain, |image| {
        mutation::set_exchange(image, n_shells, jij)
    });
}

pub fn set_dmi(
    state: &State,
    n_shells: usize,
    dij: &[f64],
    chirality: i32,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) {
    mutate(state, idx_image, idx_chain, |image| {
        mutation::set_dmi(image, n_shells, dij, chirality)
    });
}

/// `radius` in Å.
pub fn set_ddi(state: &State, radius: f64, idx_image: Option<usize>, idx_chain: Option<usize>) {
    mutate(state, idx_image, idx_chain, |image| {
        mutation::set_ddi(image, radius)
    });
}

// --- Get parameters ---

/// `None` when the image cannot be resolved.
pub fn get_name(
    state: &State,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) -> Option<&'static str> {
    guarded(state, idx_image, idx_chain, None, |image| {
        query::name(image).map(Some)
    })
}

pub fn get_boundary_conditions(
    state: &State,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) -> [bool; 3] {
    guarded(state, idx_image, idx_chain, [false; 3], query::boundary_conditions)
}

/// One moment magnitude per cell atom.
pub fn get_mu_s(state: &State, idx_image: Option<usize>, idx_chain: Option<usize>) -> Vec<f64> {
    guarded(state, idx_image, idx_chain, Vec::new(), query::mu_s)
}

/// Field magnitude in Tesla and unit direction.
pub fn get_field(
    state: &State,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) -> (f64, [f64; 3]) {
    guarded(state, idx_image, idx_chain, (0.0, [0.0, 0.0, 1.0]), |image| {
        let (magnitude, normal) = query::field(image)?;
        Ok((magnitude, normal.into()))
    })
}

pub fn get_anisotropy(
    state: &State,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) -> (f64, [f64; 3]) {
    guarded(state, idx_image, idx_chain, (0.0, [0.0, 0.0, 1.0]), |image| {
        let (magnitude, normal) = query::anisotropy(image)?;
        Ok((magnitude, normal.into()))
    })
}

/// Exchange shell magnitudes; the number of shells is their length.
pub fn get_exchange_shells(
    state: &State,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) -> Vec<f64> {
    guarded(state, idx_image, idx_chain, Vec::new(), query::exchange_shells)
}

pub fn get_exchange_n_pairs(
    state: &State,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) -> usize {
    guarded(state, idx_image, idx_chain, 0, |image| {
        unimplemented_export(image, query::exchange_n_pairs(image), 0, idx_image, idx_chain)
    })
}

pub fn get_exchange_pairs(
    state: &State,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) -> Vec<(Pair, f64)> {
    guarded(state, idx_image, idx_chain, Vec::new(), |image| {
        unimplemented_export(
            image,
            query::exchange_pairs(image),
            Vec::new(),
            idx_image,
            idx_chain,
        )
    })
}

/// DMI shell magnitudes and chirality.
pub fn get_dmi_shells(
    state: &State,
    idx_image: Option<usize>,
    idx_chain: Option<usize>,
) -> (Vec<f64>, i32) {
    guarded(state, idx_image, idx_chain, (Vec::new(), 1), query::dmi_shells)
}

pub fn get_dmi_n_pairs(state: &State, idx_image: Option<usize>, idx_chain: Option<usize>) -> usize {
    guarded(state, idx_image, idx_chain, 0, |image| {
        unimplemented_export(image, query::dmi_n_pairs(image), 0, idx_image, idx_chain)
    })
}

/// Dipolar cutoff radius in Å.
pub fn get_ddi(state: &State, idx_image: Option<usize>, idx_chain: Option<usize>) -> f64 {
    guarded(state, idx_image, idx_chain, 0.0, query::ddi_cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Geometry;
    use crate::core::hamiltonian::{Gaussian, Heisenberg};
    use crate::engine::{Chain, SpinImage};
    use serial_test::serial;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn heisenberg_image() -> SpinImage {
        let geometry = Arc::new(Geometry::simple_cubic([3, 3, 1]).unwrap());
        let model = Heisenberg::builder().build(geometry.clone()).unwrap();
        SpinImage::new(geometry, model.into()).unwrap()
    }

    fn gaussian_image() -> SpinImage {
        let geometry = Arc::new(Geometry::simple_cubic([3, 3, 1]).unwrap());
        let model = Gaussian::new(vec![1.0], vec![0.2], vec![Vector3::x()]).unwrap();
        SpinImage::new(geometry, model.into()).unwrap()
    }

    /// Chain 0 holds a Heisenberg and a Gaussian image.
    fn mixed_state() -> State {
        let chain = Chain::new(vec![Arc::new(heisenberg_image()), Arc::new(gaussian_image())])
            .unwrap();
        State::new(vec![chain]).unwrap()
    }

    #[test]
    fn set_and_get_field_round_trip_through_active_image() {
        let state = mixed_state();
        set_field(&state, 0.5, [0.0, 2.0, 0.0], None, None);
        let (magnitude, normal) = get_field(&state, None, None);
        assert!((magnitude - 0.5).abs() < 1e-12);
        assert_eq!(normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn exchange_shells_round_trip() {
        let state = mixed_state();
        set_exchange(&state, 2, &[1.0, 0.3], Some(0), Some(0));
        assert_eq!(get_exchange_shells(&state, Some(0), Some(0)), vec![1.0, 0.3]);
    }

    #[test]
    fn getters_return_defaults_for_unresolvable_image() {
        let state = mixed_state();
        assert_eq!(get_name(&state, Some(7), None), None);
        assert_eq!(get_ddi(&state, None, Some(3)), 0.0);
        assert_eq!(get_field(&state, Some(9), None), (0.0, [0.0, 0.0, 1.0]));
        assert!(get_mu_s(&state, Some(9), None).is_empty());
    }

    #[test]
    fn unsupported_setter_leaves_gaussian_image_unchanged() {
        let state = mixed_state();
        let before = state.resolve(Some(1), None).unwrap();
        let before = before.read().hamiltonian.as_gaussian().cloned();
        set_mu_s(&state, 3.0, Some(1), None);
        set_ddi(&state, 2.0, Some(1), None);
        let after = state.resolve(Some(1), None).unwrap();
        let after = after.read().hamiltonian.as_gaussian().cloned();
        assert_eq!(before, after);
        assert_eq!(get_name(&state, Some(1), None), Some("Gaussian"));
    }

    #[test]
    #[serial]
    fn applied_mutation_is_logged_at_info_with_indices() {
        let state = mixed_state();
        let logs = capture_logs(|| set_ddi(&state, 1.5, Some(0), Some(0)));
        assert!(logs.contains("INFO"));
        assert!(logs.contains("Set ddi radius to 1.5"));
        assert!(logs.contains("idx_image=0"));
        assert!(logs.contains("idx_chain=0"));
    }

    #[test]
    #[serial]
    fn unsupported_mutation_is_logged_as_warning() {
        let state = mixed_state();
        let logs = capture_logs(|| set_field(&state, 1.0, [0.0, 0.0, 1.0], Some(1), None));
        assert!(logs.contains("WARN"));
        assert!(logs.contains("External field cannot be set on Gaussian"));
        assert!(logs.contains("idx_chain=active"));
    }

    #[test]
    #[serial]
    fn invalid_input_is_logged_as_error_and_suppressed() {
        let state = mixed_state();
        let logs = capture_logs(|| set_anisotropy(&state, 1.0, [0.0, 0.0, 0.0], None, None));
        assert!(logs.contains("ERROR"));
        assert_eq!(get_anisotropy(&state, None, None), (0.0, [0.0, 0.0, 1.0]));
    }

    #[test]
    #[serial]
    fn unresolvable_image_is_logged_as_error() {
        let state = mixed_state();
        let logs = capture_logs(|| set_mu_s(&state, 2.0, Some(5), Some(0)));
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("Image 5 not found in chain 0"));
    }

    #[test]
    #[serial]
    fn pair_export_warns_and_returns_empty() {
        let state = mixed_state();
        let mut n_pairs = usize::MAX;
        let logs = capture_logs(|| n_pairs = get_exchange_n_pairs(&state, None, None));
        assert_eq!(n_pairs, 0);
        assert!(logs.contains("WARN"));
        assert!(logs.contains(
            "Heisenberg Hamiltonian: fetching exchange pairs is not yet implemented..."
        ));
        assert!(get_exchange_pairs(&state, None, None).is_empty());
        assert_eq!(get_dmi_n_pairs(&state, None, None), 0);
    }

    #[test]
    #[serial]
    fn panic_inside_call_is_caught_and_logged() {
        let state = mixed_state();
        let mut value = -1.0;
        let logs = capture_logs(|| {
            value = guarded(&state, None, None, 0.0, |_| -> Result<f64, EngineError> {
                panic!("deliberate fault in boundary call")
            });
        });
        assert_eq!(value, 0.0);
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("deliberate fault in boundary call"));
    }
}
