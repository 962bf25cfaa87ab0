use ndarray::{s, Zip};

use crate::math::stats::StatsHelper;
use crate::prelude::{KernelResult, TraceLayout};
use crate::telemetry::log::LogManager;

/// Automatic gain control: scales each sample by the inverse mean energy of
/// a centered sliding window.
///
/// With `half = windowsize / 2` (integer truncation), the window at column
/// `j` is the inclusive span `[j - half, j + half]` clipped to the trace, so
/// the live sample count is `min(j, half) + min(len - 1 - j, half) + 1` at
/// every column. The window grows while it enters the trace, slides through
/// the interior by adding the entering sample and removing the exiting one,
/// and shrinks again toward the far edge. Each output is
/// `in[j] * count / (window_energy + damp)`; scaling by the live count
/// compensates the energy deficit of the clipped edge windows. A window
/// longer than the trace clips to the whole trace.
pub fn automatic_gain_control(
    input: &[f32],
    output: &mut [f32],
    layout: &TraceLayout,
    windowsize: usize,
    damp: f64,
) -> KernelResult<()> {
    let traces = layout.view(input)?;
    let mut gained = layout.view_mut(output)?;

    let logger = LogManager::scoped("automaticGainControl");
    logger.record(&format!(
        "traces {} samples {} window {} rms {:.4}",
        layout.traces,
        layout.samples,
        windowsize,
        StatsHelper::rms(traces.view())
    ));

    let half = windowsize / 2;

    Zip::from(traces.rows())
        .and(gained.rows_mut())
        .par_for_each(|trace, mut gain| {
            let len = trace.len();
            if len == 0 {
                return;
            }

            // Window for column 0: samples [0, half] clipped to the trace.
            let seed = (half + 1).min(len);
            let mut window_energy = StatsHelper::sum_squares(trace.slice(s![..seed]));
            let mut count = seed;

            for j in 0..len {
                gain[j] =
                    (f64::from(trace[j]) * count as f64 / (window_energy + damp)) as f32;

                if j + 1 < len {
                    if j + 1 + half < len {
                        let enter = f64::from(trace[j + 1 + half]);
                        window_energy += enter * enter;
                        count += 1;
                    }
                    if j >= half {
                        let exit = f64::from(trace[j - half]);
                        window_energy -= exit * exit;
                        count -= 1;
                    }
                }
            }
        });

    Ok(())
}
