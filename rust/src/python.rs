//! Python bindings used by the dashboard.
//!
//! Allocations cross the boundary as plain dicts keyed by
//! "segment - channel", so the presentation layer can chart them directly
//! and hand them back for projection.

use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::{PyIOError, PyKeyError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::config::EstimatorConfig;
use crate::engine::RoiEngine;
use crate::error::EstimatorError;
use crate::optimization::{Allocation, AllocationEntry};
use crate::saturation::{diminishing_returns_curve, DEFAULT_DAMPING};

impl From<EstimatorError> for PyErr {
    fn from(err: EstimatorError) -> Self {
        match &err {
            EstimatorError::UnknownSegment(_) | EstimatorError::UnknownChannel { .. } => {
                PyKeyError::new_err(err.to_string())
            }
            EstimatorError::Io(_) => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Python module definition
#[pymodule]
fn roi_estimator_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyRoiEngine>()?;
    m.add_function(wrap_pyfunction!(diminishing_returns_rust, m)?)?;
    Ok(())
}

/// Diminishing-returns adjusted conversion rate for each budget level.
#[pyfunction]
#[pyo3(signature = (budgets, base_rate, optimal_budget, damping = DEFAULT_DAMPING))]
fn diminishing_returns_rust(
    py: Python,
    budgets: PyReadonlyArray1<f64>,
    base_rate: f64,
    optimal_budget: f64,
    damping: f64,
) -> Py<PyArray1<f64>> {
    let budgets = budgets.as_array();
    let result = diminishing_returns_curve(&budgets, base_rate, optimal_budget, damping);
    result.into_pyarray(py).to_owned()
}

/// Allocation and ROI engine, exposed to Python as `RoiEngine`.
#[pyclass(name = "RoiEngine")]
pub struct PyRoiEngine {
    engine: RoiEngine,
}

#[pymethods]
impl PyRoiEngine {
    #[new]
    #[pyo3(signature = (config_path = None))]
    fn new(config_path: Option<&str>) -> PyResult<Self> {
        let engine = match config_path {
            Some(path) => RoiEngine::from_config(&EstimatorConfig::load(path)?)?,
            None => RoiEngine::default(),
        };
        Ok(Self { engine })
    }

    /// Segment names in catalog order.
    fn segments(&self) -> Vec<String> {
        self.engine.catalog().segment_names().map(str::to_string).collect()
    }

    /// Channel names of one segment.
    fn channels(&self, segment: &str) -> PyResult<Vec<String>> {
        let segment = self.engine.catalog().segment(segment)?;
        Ok(segment.channels.iter().map(|c| c.name.clone()).collect())
    }

    fn efficiency(&self, segment: &str, channel: &str) -> PyResult<f64> {
        Ok(self.engine.efficiency(segment, channel)?)
    }

    /// Allocate a budget; returns {"segment - channel": {...}} in funding order.
    fn allocate(&self, py: Python, total_budget: f64, segments: Vec<String>) -> PyResult<Py<PyDict>> {
        let allocation = self.engine.allocate(total_budget, &segments)?;
        allocation_to_dict(py, &allocation)
    }

    /// Project an allocation dict over `timeline_months`.
    #[pyo3(signature = (allocation, timeline_months = 12))]
    fn project(&self, py: Python, allocation: &PyDict, timeline_months: u32) -> PyResult<Py<PyDict>> {
        let allocation = allocation_from_dict(allocation)?;
        let metrics = self.engine.project(&allocation, timeline_months)?;

        let dict = PyDict::new(py);
        dict.set_item("total_leads", metrics.total_leads)?;
        dict.set_item("total_conversions", metrics.total_conversions)?;
        dict.set_item("total_revenue", metrics.total_revenue)?;
        dict.set_item("total_cost", metrics.total_cost)?;
        dict.set_item("overall_roi", metrics.overall_roi)?;
        dict.set_item("market_penetration", metrics.market_penetration)?;

        let performance = PyList::empty(py);
        for perf in &metrics.channel_performance {
            let row = PyDict::new(py);
            row.set_item("segment", &perf.segment)?;
            row.set_item("channel", &perf.channel)?;
            row.set_item("budget", perf.budget)?;
            row.set_item("leads", perf.leads)?;
            row.set_item("conversions", perf.conversions)?;
            row.set_item("revenue", perf.revenue)?;
            row.set_item("roi", perf.roi)?;
            row.set_item("efficiency", perf.efficiency)?;
            performance.append(row)?;
        }
        dict.set_item("channel_performance", performance)?;
        Ok(dict.into())
    }

    /// Budget sweep for one pair; the series come back as numpy arrays.
    #[pyo3(signature = (allocation, segment, channel, timeline_months = 12))]
    fn response_curve(
        &self,
        py: Python,
        allocation: &PyDict,
        segment: &str,
        channel: &str,
        timeline_months: u32,
    ) -> PyResult<Py<PyDict>> {
        let allocation = allocation_from_dict(allocation)?;
        let curve = self
            .engine
            .response_curve(&allocation, segment, channel, timeline_months)?;

        let dict = PyDict::new(py);
        dict.set_item("current_budget", curve.current_budget)?;
        dict.set_item("saturation_budget", curve.saturation_budget)?;
        dict.set_item("optimal_budget", curve.optimal_budget)?;
        dict.set_item("optimal_roi", curve.optimal_roi)?;
        dict.set_item("recommended_change", curve.recommended_change)?;
        dict.set_item("budgets", curve.budgets.into_pyarray(py))?;
        dict.set_item("roi", curve.roi.into_pyarray(py))?;
        dict.set_item("conversions", curve.conversions.into_pyarray(py))?;
        Ok(dict.into())
    }

    /// Full estimate serialized as pretty JSON, ready for download.
    fn report_json(&self, total_budget: f64, segments: Vec<String>, timeline_months: u32) -> PyResult<String> {
        let report = self.engine.estimate(total_budget, &segments, timeline_months)?;
        Ok(report.to_json()?)
    }
}

fn allocation_to_dict(py: Python, allocation: &Allocation) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    for entry in allocation.entries() {
        let row = PyDict::new(py);
        row.set_item("segment", &entry.segment)?;
        row.set_item("channel", &entry.channel)?;
        row.set_item("budget", entry.budget)?;
        row.set_item("efficiency", entry.efficiency)?;
        dict.set_item(entry.key(), row)?;
    }
    Ok(dict.into())
}

fn allocation_from_dict(dict: &PyDict) -> PyResult<Allocation> {
    let mut entries = Vec::with_capacity(dict.len());
    for (_, value) in dict.iter() {
        let row: &PyDict = value.downcast()?;
        entries.push(AllocationEntry {
            segment: required(row, "segment")?,
            channel: required(row, "channel")?,
            budget: required(row, "budget")?,
            efficiency: required(row, "efficiency")?,
        });
    }
    let total_budget = entries.iter().map(|e| e.budget).sum();
    Ok(Allocation::new(total_budget, entries))
}

fn required<'py, T: FromPyObject<'py>>(row: &'py PyDict, key: &str) -> PyResult<T> {
    row.get_item(key)?
        .ok_or_else(|| PyKeyError::new_err(format!("allocation entry missing '{key}'")))?
        .extract()
}
