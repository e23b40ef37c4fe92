//! Python extension module.

use crate::dictionary;
use crate::pipeline::Corrector;
use crate::reprocess::ReprocessAdvisor;
use lazy_static::lazy_static;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

lazy_static! {
    static ref CORRECTOR: Corrector = Corrector::default();
    static ref ADVISOR: ReprocessAdvisor = ReprocessAdvisor::default();
}

/// Correct one raw OCR span. Returns `"{label} {body}"`.
#[pyfunction]
fn correct_text(text: String) -> PyResult<String> {
    CORRECTOR
        .correct_text(&text)
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Correct many spans in parallel; output order matches input order.
#[pyfunction]
fn correct_batch(texts: Vec<String>) -> PyResult<Vec<String>> {
    let corrections = CORRECTOR
        .correct_batch(&texts)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(corrections.iter().map(|c| c.line()).collect())
}

/// Returns: (needs_retry, oem, psm)
#[pyfunction]
fn should_reprocess(text: String) -> PyResult<(bool, Option<u8>, Option<u8>)> {
    Ok(ADVISOR.should_reprocess(&text).as_tuple())
}

/// Load the legend dictionary from a directory. Returns False if the
/// directory does not exist.
#[pyfunction]
fn init_dictionary(dict_dir: String) -> PyResult<bool> {
    Ok(dictionary::init_dictionary(&dict_dir))
}

#[pyfunction]
fn correct_legend(segments: Vec<String>) -> PyResult<Vec<String>> {
    Ok(dictionary::global().correct_segments(&segments))
}

#[pymodule]
fn weather_ocr_correct(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(correct_text, m)?)?;
    m.add_function(wrap_pyfunction!(correct_batch, m)?)?;
    m.add_function(wrap_pyfunction!(should_reprocess, m)?)?;
    m.add_function(wrap_pyfunction!(init_dictionary, m)?)?;
    m.add_function(wrap_pyfunction!(correct_legend, m)?)?;
    Ok(())
}
