//! Raw form state for one interactive session.

use zeroize::Zeroize;

use super::field::ClinicalField;

/// Raw text value of every clinical field plus the submission guard.
///
/// Values are kept exactly as typed; coercion happens only in
/// [`Payload::encode`](super::Payload::encode). Buffers are wiped when
/// replaced, reset or dropped, so the type is deliberately not `Clone`.
#[derive(Debug, Default)]
pub struct FormState {
    values: [String; ClinicalField::COUNT],
    touched: [bool; ClinicalField::COUNT],
    submitting: bool,
    #[cfg(test)]
    guard_releases: usize,
}

impl FormState {
    /// Empty form, nothing submitting.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the raw value of `field`. Any text is accepted.
    pub fn set_field(&mut self, field: ClinicalField, raw: impl Into<String>) {
        let slot = &mut self.values[field.index()];
        slot.zeroize();
        *slot = raw.into();
        self.touched[field.index()] = true;
    }

    /// Append one typed character to `field` without leaving a stale copy
    /// behind when the buffer grows.
    pub fn push_char(&mut self, field: ClinicalField, c: char) {
        let slot = &mut self.values[field.index()];
        if slot.len() + c.len_utf8() > slot.capacity() {
            let mut grown = String::with_capacity((slot.capacity() * 2).max(16));
            grown.push_str(slot);
            slot.zeroize();
            *slot = grown;
        }
        slot.push(c);
        self.touched[field.index()] = true;
    }

    /// Remove the last character of `field`. The removed byte stays in spare
    /// capacity until the next overwrite, reset or drop.
    pub fn pop_char(&mut self, field: ClinicalField) {
        self.values[field.index()].pop();
        self.touched[field.index()] = true;
    }

    /// Current raw value of `field`.
    #[must_use]
    pub fn value(&self, field: ClinicalField) -> &str {
        &self.values[field.index()]
    }

    #[must_use]
    pub fn is_touched(&self, field: ClinicalField) -> bool {
        self.touched[field.index()]
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Raise the submission guard.
    ///
    /// Returns `false` without changing anything if a submission is already
    /// in flight.
    #[must_use = "a refused submission must not be sent"]
    pub fn begin_submission(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        true
    }

    /// Lower the submission guard.
    pub fn end_submission(&mut self) {
        self.submitting = false;
        #[cfg(test)]
        {
            self.guard_releases += 1;
        }
    }

    /// Number of `end_submission` calls so far.
    #[cfg(test)]
    pub(crate) fn guard_releases(&self) -> usize {
        self.guard_releases
    }

    /// Wipe every raw value and touched mark.
    ///
    /// Returns `false` and keeps the values while a submission is in flight.
    pub fn reset(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        for value in self.values.iter_mut() {
            value.zeroize();
        }
        self.touched = [false; ClinicalField::COUNT];
        true
    }

    /// Fields paired with their raw values, in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (ClinicalField, &str)> + '_ {
        ClinicalField::ALL
            .into_iter()
            .map(move |field| (field, self.value(field)))
    }
}

impl Drop for FormState {
    fn drop(&mut self) {
        for value in self.values.iter_mut() {
            value.zeroize();
        }
    }
}
