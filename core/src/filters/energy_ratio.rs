use ndarray::Zip;

use crate::math::stats::StatsHelper;
use crate::prelude::{KernelError, KernelResult, TraceLayout};
use crate::telemetry::log::LogManager;

/// Short-term/long-term energy ratio along each trace.
///
/// Every trace carries two running sums in double precision: the cumulative
/// energy from the first sample, and the energy of the trailing window of
/// `windowsize` samples, updated incrementally by adding the newest square
/// and removing the one that left the window. Columns before the window has
/// filled are written as exact zeros; afterwards the output is
/// `window_energy / (total_energy + damp)`. A sharp rise in the ratio marks
/// the onset of coherent energy, which is what makes this a first-break
/// picker.
pub fn energy_ratio(
    input: &[f32],
    output: &mut [f32],
    layout: &TraceLayout,
    windowsize: usize,
    damp: f64,
) -> KernelResult<()> {
    if windowsize > layout.samples {
        return Err(KernelError::InvalidShape(format!(
            "window of {} samples exceeds trace length {}",
            windowsize, layout.samples
        )));
    }

    let traces = layout.view(input)?;
    let mut ratios = layout.view_mut(output)?;

    let logger = LogManager::scoped("energyRatio");
    logger.record(&format!(
        "traces {} samples {} window {} rms {:.4}",
        layout.traces,
        layout.samples,
        windowsize,
        StatsHelper::rms(traces.view())
    ));

    Zip::from(traces.rows())
        .and(ratios.rows_mut())
        .par_for_each(|trace, mut ratio| {
            let mut total_energy = 0.0f64;
            for j in 0..windowsize {
                let cur = f64::from(trace[j]);
                total_energy += cur * cur;
                ratio[j] = 0.0;
            }
            // The trailing window now holds exactly the energy seen so far.
            let mut window_energy = total_energy;
            for j in windowsize..trace.len() {
                let cur = f64::from(trace[j]);
                let cursq = cur * cur;
                total_energy += cursq;
                let old = f64::from(trace[j - windowsize]);
                window_energy += cursq - old * old;
                ratio[j] = (window_energy / (total_energy + damp)) as f32;
            }
        });

    Ok(())
}
