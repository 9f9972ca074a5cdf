use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::data::{AuthMode, TodoStore};
use crate::error::DataError;
use crate::models::Todo;

/// Scripted store that counts the calls it receives.
pub(crate) struct StubStore {
    mode: AuthMode,
    list_result: Mutex<Result<Vec<Todo>, DataError>>,
    write_error: Mutex<Option<DataError>>,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl StubStore {
    pub fn with_todos(mode: AuthMode, todos: Vec<Todo>) -> Self {
        Self {
            mode,
            list_result: Mutex::new(Ok(todos)),
            write_error: Mutex::new(None),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_list(mode: AuthMode, error: DataError) -> Self {
        let store = Self::with_todos(mode, Vec::new());
        *store.list_result.lock().unwrap() = Err(error);
        store
    }

    pub fn fail_writes(&self, error: DataError) {
        *self.write_error.lock().unwrap() = Some(error);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub(crate) fn todo(id: &str, content: &str) -> Todo {
    Todo {
        id: id.to_string(),
        content: content.to_string(),
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl TodoStore for StubStore {
    fn auth_mode(&self) -> AuthMode {
        self.mode
    }

    async fn list(&self) -> Result<Vec<Todo>, DataError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_result.lock().unwrap().clone()
    }

    async fn create(&self, content: &str) -> Result<Todo, DataError> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.write_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(todo(&format!("created-{}", n), content.trim()))
    }

    async fn delete(&self, _id: &str) -> Result<(), DataError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match self.write_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
