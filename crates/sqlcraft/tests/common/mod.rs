//! In-memory driver used by the lifecycle tests.
//!
//! Statements either replay a seeded result set for their exact SQL text or,
//! when nothing is seeded, echo the effective parameters back as a single
//! row. The shared state records every connect, prepare and execute so tests
//! can assert on the lifecycle.

#![allow(dead_code)]

use sqlcraft::{
    Attr, ConnectConfig, Driver, DriverConnection, DriverError, DriverStatement, FetchMode,
    ParamId, ParamMap, ParamType, Row, Value, ValueRef,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Default)]
pub struct DriverState {
    pub connect_count: usize,
    pub fail_connect: Option<DriverError>,
    pub fail_prepare: HashMap<String, DriverError>,
    pub prepared: Vec<String>,
    pub executed: Vec<(String, ParamMap)>,
    pub results: HashMap<String, ResultSet>,
    pub affected: HashMap<String, u64>,
    pub attributes: HashMap<Attr, Value>,
    pub native_quote: bool,
    pub last_insert_id: i64,
    pub applied_charset: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MemoryDriver {
    dialect: String,
    state: Arc<Mutex<DriverState>>,
}

impl MemoryDriver {
    pub fn new(dialect: &str) -> Self {
        Self {
            dialect: dialect.to_string(),
            state: Arc::new(Mutex::new(DriverState::default())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<DriverState>> {
        self.state.clone()
    }

    pub fn seed_result(&self, sql: &str, columns: &[&str], rows: Vec<Vec<Value>>) {
        self.state.lock().unwrap().results.insert(
            sql.to_string(),
            ResultSet {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        );
    }

    pub fn seed_affected(&self, sql: &str, affected: u64) {
        self.state
            .lock()
            .unwrap()
            .affected
            .insert(sql.to_string(), affected);
    }

    pub fn seed_attribute(&self, attr: Attr, value: Value) {
        self.state.lock().unwrap().attributes.insert(attr, value);
    }

    pub fn fail_prepare_with(&self, sql: &str, error: DriverError) {
        self.state
            .lock()
            .unwrap()
            .fail_prepare
            .insert(sql.to_string(), error);
    }

    pub fn fail_connect_with(&self, error: DriverError) {
        self.state.lock().unwrap().fail_connect = Some(error);
    }

    pub fn enable_native_quote(&self) {
        self.state.lock().unwrap().native_quote = true;
    }

    pub fn set_last_insert_id(&self, id: i64) {
        self.state.lock().unwrap().last_insert_id = id;
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().unwrap().connect_count
    }

    pub fn prepared(&self) -> Vec<String> {
        self.state.lock().unwrap().prepared.clone()
    }

    pub fn executed(&self) -> Vec<(String, ParamMap)> {
        self.state.lock().unwrap().executed.clone()
    }
}

impl Driver for MemoryDriver {
    fn dialect(&self) -> &str {
        &self.dialect
    }

    fn connect(&self, config: &ConnectConfig) -> Result<Box<dyn DriverConnection>, DriverError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = &state.fail_connect {
            return Err(err.clone());
        }
        state.connect_count += 1;
        state.applied_charset = Some(config.charset.clone());
        Ok(Box::new(MemoryConnection {
            state: self.state.clone(),
        }))
    }
}

struct MemoryConnection {
    state: Arc<Mutex<DriverState>>,
}

impl DriverConnection for MemoryConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn DriverStatement>, DriverError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_prepare.get(sql) {
            return Err(err.clone());
        }
        state.prepared.push(sql.to_string());
        Ok(Box::new(MemoryStatement {
            state: self.state.clone(),
            sql: sql.to_string(),
            bound_values: Vec::new(),
            bound_refs: Vec::new(),
            columns: None,
            pending_rows: VecDeque::new(),
            affected: 0,
        }))
    }

    fn quote(&self, literal: &str) -> Option<String> {
        if !self.state.lock().unwrap().native_quote {
            return None;
        }
        Some(format!("'{}'", literal.replace('\'', "''")))
    }

    fn get_attribute(&self, attr: Attr) -> Result<Value, DriverError> {
        self.state
            .lock()
            .unwrap()
            .attributes
            .get(&attr)
            .cloned()
            .ok_or_else(|| DriverError::new(format!("attribute {attr:?} not supported")))
    }

    fn set_attribute(&mut self, attr: Attr, value: Value) -> Result<(), DriverError> {
        self.state.lock().unwrap().attributes.insert(attr, value);
        Ok(())
    }

    fn last_insert_id(&self, _sequence: Option<&str>) -> Result<i64, DriverError> {
        Ok(self.state.lock().unwrap().last_insert_id)
    }
}

struct MemoryStatement {
    state: Arc<Mutex<DriverState>>,
    sql: String,
    bound_values: Vec<(ParamId, Value)>,
    bound_refs: Vec<(ParamId, ValueRef)>,
    columns: Option<Arc<Vec<String>>>,
    pending_rows: VecDeque<Vec<Value>>,
    affected: u64,
}

impl DriverStatement for MemoryStatement {
    fn bind_param(
        &mut self,
        id: &ParamId,
        value: ValueRef,
        _ty: ParamType,
    ) -> Result<(), DriverError> {
        self.bound_refs.push((id.clone(), value));
        Ok(())
    }

    fn bind_value(&mut self, id: &ParamId, value: Value, _ty: ParamType) -> Result<(), DriverError> {
        self.bound_values.push((id.clone(), value));
        Ok(())
    }

    fn execute(&mut self, params: Option<&ParamMap>) -> Result<(), DriverError> {
        let effective: ParamMap = match params {
            Some(map) => map.clone(),
            None => {
                let mut map = ParamMap::new();
                for (id, value) in &self.bound_values {
                    map.insert(id.to_string(), value.clone());
                }
                // Reference-bound cells are read now, at execution time.
                for (id, cell) in &self.bound_refs {
                    map.insert(id.to_string(), cell.get());
                }
                map
            }
        };

        let mut state = self.state.lock().unwrap();
        state.executed.push((self.sql.clone(), effective.clone()));

        if let Some(result) = state.results.get(&self.sql) {
            self.columns = Some(Arc::new(result.columns.clone()));
            self.pending_rows = result.rows.clone().into();
            self.affected = state
                .affected
                .get(&self.sql)
                .copied()
                .unwrap_or(result.rows.len() as u64);
        } else {
            // Echo statement: one row reflecting the effective parameters.
            let columns: Vec<String> = effective.keys().cloned().collect();
            let values: Vec<Value> = effective.values().cloned().collect();
            self.pending_rows = if values.is_empty() {
                VecDeque::new()
            } else {
                VecDeque::from(vec![values])
            };
            self.columns = Some(Arc::new(columns));
            self.affected = state.affected.get(&self.sql).copied().unwrap_or(1);
        }
        Ok(())
    }

    fn row_count(&self) -> u64 {
        self.affected
    }

    fn column_count(&self) -> usize {
        self.columns.as_ref().map(|c| c.len()).unwrap_or(0)
    }

    fn fetch(&mut self, mode: FetchMode) -> Option<Row> {
        let values = self.pending_rows.pop_front()?;
        let columns = match mode {
            FetchMode::Num => None,
            FetchMode::Assoc | FetchMode::Both => self.columns.clone(),
        };
        Some(Row::new(columns, values))
    }
}
