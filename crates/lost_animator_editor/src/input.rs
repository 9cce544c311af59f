// SPDX-License-Identifier: MIT OR Apache-2.0
//! Numeric text fields.

use crate::document::DocumentController;

/// Value change per pixel of horizontal drag
pub const DEFAULT_DRAG_SPEED: f64 = 0.01;

/// A number field edited as text or by dragging.
///
/// Typing only changes the draft. [`NumericInput::commit`] turns the draft
/// into a value, or throws it away when it does not parse. Dragging writes
/// live values inside one history batch, so a whole scrub undoes at once.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericInput {
    value: f64,
    draft: String,
    min: f64,
    max: f64,
    precision: usize,
    drag_speed: f64,
    drag_start: Option<f64>,
}

impl NumericInput {
    /// Create a field showing `value` with `precision` decimals
    pub fn new(value: f64, precision: usize) -> Self {
        Self {
            value,
            draft: format!("{value:.precision$}"),
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            precision,
            drag_speed: DEFAULT_DRAG_SPEED,
            drag_start: None,
        }
    }

    /// Change how much one pixel of drag moves the value
    pub fn with_drag_speed(mut self, speed: f64) -> Self {
        if speed.is_finite() {
            self.drag_speed = speed;
        }
        self
    }

    /// Restrict committed values to `[min, max]`
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max.max(min);
        self.value = self.value.clamp(self.min, self.max);
        self.revert();
        self
    }

    /// Last committed value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Text being edited
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft text
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Show a value changed from outside, dropping any draft
    pub fn set_value(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max);
        self.revert();
    }

    /// Parse the draft.
    ///
    /// Returns the new clamped value, or `None` after reverting the draft
    /// when the text is not a finite number.
    pub fn commit(&mut self) -> Option<f64> {
        let parsed = self
            .draft
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite());

        match parsed {
            Some(value) => {
                self.value = value.clamp(self.min, self.max);
                self.revert();
                Some(self.value)
            }
            None => {
                tracing::debug!("Discarding invalid number {:?}", self.draft);
                self.revert();
                None
            }
        }
    }

    /// Reset the draft to the committed value
    pub fn revert(&mut self) {
        self.draft = format!("{:.*}", self.precision, self.value);
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    /// Press on the field: remember the value and open a batch
    pub fn begin_drag(&mut self, doc: &mut DocumentController) {
        if self.drag_start.is_some() {
            return;
        }
        self.drag_start = Some(self.value);
        doc.start_batch();
    }

    /// Move the pointer `pixels` to the right of where the drag began.
    ///
    /// The new value is handed to `apply`, which writes it to the document.
    /// Returns what `apply` returns, or `false` outside a drag.
    pub fn drag_to(
        &mut self,
        doc: &mut DocumentController,
        pixels: f64,
        apply: impl FnOnce(&mut DocumentController, f64) -> bool,
    ) -> bool {
        let Some(start) = self.drag_start else {
            return false;
        };
        if !pixels.is_finite() {
            return false;
        }
        let value = (start + pixels * self.drag_speed).clamp(self.min, self.max);
        self.value = value;
        self.revert();
        apply(doc, value)
    }

    /// Release the field and close the batch.
    ///
    /// Returns `true` if the drag recorded an undo step.
    pub fn end_drag(&mut self, doc: &mut DocumentController) -> bool {
        if self.drag_start.take().is_none() {
            return false;
        }
        doc.end_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::controller;
    use lost_animator_timeline::AnimationPatch;
    use std::sync::Arc;

    #[test]
    fn test_commit_parses_and_clamps() {
        let mut input = NumericInput::new(1.0, 2).with_range(0.1, 10.0);
        input.set_draft(" 2.5 ");
        assert_eq!(input.commit(), Some(2.5));
        assert_eq!(input.draft(), "2.50");

        input.set_draft("99");
        assert_eq!(input.commit(), Some(10.0));
        assert_eq!(input.draft(), "10.00");

        input.set_draft("-1");
        assert_eq!(input.commit(), Some(0.1));
    }

    #[test]
    fn test_invalid_text_reverts() {
        let mut input = NumericInput::new(0.75, 2);
        input.set_draft("abc");
        assert_eq!(input.commit(), None);
        assert_eq!(input.value(), 0.75);
        assert_eq!(input.draft(), "0.75");

        input.set_draft("NaN");
        assert_eq!(input.commit(), None);
        input.set_draft("");
        assert_eq!(input.commit(), None);
        assert_eq!(input.draft(), "0.75");
    }

    #[test]
    fn test_drag_scrub_is_one_undo_step() {
        let mut doc = controller();
        let id = doc.add_animation();
        let before = doc.snapshot();
        let undo_count = doc.history_stats().undo_count;
        let duration = |doc: &DocumentController| doc.selected_animation().unwrap().duration;

        let mut input = NumericInput::new(duration(&doc), 2)
            .with_range(0.1, 60.0)
            .with_drag_speed(0.25);
        input.begin_drag(&mut doc);
        assert!(input.is_dragging());
        for pixels in [1.0, 4.0, 7.0, 10.0] {
            input.drag_to(&mut doc, pixels, |doc, value| {
                doc.update_animation(&id, &AnimationPatch::duration(value))
            });
        }
        assert_eq!(input.value(), 3.5);
        assert_eq!(input.draft(), "3.50");
        assert_eq!(duration(&doc), 3.5);
        assert!(input.end_drag(&mut doc));
        assert!(!input.is_dragging());

        assert_eq!(doc.history_stats().undo_count, undo_count + 1);
        assert!(doc.undo());
        assert!(Arc::ptr_eq(&before, &doc.snapshot()));
        assert_eq!(duration(&doc), 1.0);
    }

    #[test]
    fn test_drag_back_to_start_records_nothing() {
        let mut doc = controller();
        let id = doc.add_animation();
        let undo_count = doc.history_stats().undo_count;

        let mut input = NumericInput::new(1.0, 2).with_drag_speed(0.5);
        input.begin_drag(&mut doc);
        for pixels in [2.0, 4.0, 0.0] {
            input.drag_to(&mut doc, pixels, |doc, value| {
                doc.update_animation(&id, &AnimationPatch::duration(value))
            });
        }
        assert!(!input.end_drag(&mut doc));
        assert_eq!(doc.history_stats().undo_count, undo_count);
        assert_eq!(input.value(), 1.0);
    }

    #[test]
    fn test_drag_clamps_and_needs_begin() {
        let mut doc = controller();
        let mut input = NumericInput::new(1.0, 1).with_range(0.5, 2.0);
        assert!(!input.drag_to(&mut doc, 10.0, |_, _| true));
        assert!(!input.end_drag(&mut doc));

        input.begin_drag(&mut doc);
        input.drag_to(&mut doc, 1000.0, |_, _| true);
        assert_eq!(input.value(), 2.0);
        input.drag_to(&mut doc, -1000.0, |_, _| true);
        assert_eq!(input.value(), 0.5);
        input.end_drag(&mut doc);
        assert!(!doc.is_batching());
    }

    #[test]
    fn test_set_value_drops_draft() {
        let mut input = NumericInput::new(0.0, 0).with_range(0.0, 5.0);
        input.set_draft("3");
        input.set_value(7.0);
        assert_eq!(input.value(), 5.0);
        assert_eq!(input.draft(), "5");
    }
}
