//! Store key/path conventions.
//!
//! Pure string functions. These define the canonical layout of documents in
//! whatever backs the task/form store (a directory tree for the file store).

pub fn protocol(protocol_id: &str) -> String {
    format!("protocols/{protocol_id}.json")
}

pub fn form(form_id: &str) -> String {
    format!("forms/{form_id}.json")
}

pub fn patient_form_progress(patient_id: &str, form_instance_id: &str) -> String {
    format!("progress/{patient_id}/{form_instance_id}.json")
}

pub fn completion_records(patient_id: &str, protocol_id: &str) -> String {
    format!("completions/{patient_id}/{protocol_id}.json")
}

pub const PROTOCOLS_PREFIX: &str = "protocols/";

pub const FORMS_PREFIX: &str = "forms/";

/// Whether `segment` can stand as one `/`-separated part of a key: every id
/// passed to the functions above must pass this. Rejects anything a
/// filesystem would read as navigation rather than a name.
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}
