//! Final window filter applied to every fetch result.

use crate::trip::Timed;
use crate::window::TimeWindow;

/// Keep records whose own interval lies in `window`, dropping duplicates.
///
/// Containment includes the same-start-date rule of
/// [`TimeWindow::contains`]. First-seen order is preserved.
pub fn within_window<R, I>(records: I, window: &TimeWindow) -> Vec<R>
where
    R: Timed + PartialEq,
    I: IntoIterator<Item = R>,
{
    let mut kept: Vec<R> = Vec::new();
    for record in records {
        if window.contains(&record.interval()) && !kept.contains(&record) {
            kept.push(record);
        }
    }
    kept
}
