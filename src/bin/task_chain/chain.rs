use crate::broker::{Broker, GroupId, TaskCall, TaskOutcome, TaskRecord};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct ChainOptions {
    /// Keep results in the expiring cache instead of the durable store.
    pub cached: bool,
    /// Execute on the caller's thread.
    pub sync: bool,
    /// Group name; a random id when absent.
    pub group: Option<String>,
}

impl ChainOptions {
    pub fn cached() -> Self {
        Self {
            cached: true,
            ..Self::default()
        }
    }

    pub fn sync() -> Self {
        Self {
            sync: true,
            ..Self::default()
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            group: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Builder for a sequence of tasks sharing one group.
pub struct Chain<'b> {
    broker: &'b Broker,
    tasks: Vec<TaskCall>,
    group: GroupId,
    options: ChainOptions,
    started: bool,
}

impl<'b> Chain<'b> {
    pub fn new(broker: &'b Broker, options: ChainOptions) -> Self {
        let group = match &options.group {
            Some(name) => GroupId::named(name.clone()),
            None => GroupId::random(),
        };
        Self {
            broker,
            tasks: Vec::new(),
            group,
            options,
            started: false,
        }
    }

    /// Adds a task and returns the new chain length. Unknown functions are
    /// still queued and fail when they run.
    pub fn append(&mut self, func: impl Into<String>, args: &[f64]) -> usize {
        let call = TaskCall::new(func, args);
        if !self.broker.knows(&call.func) {
            tracing::warn!(
                group = %self.group,
                func = %call.func,
                "appending unknown task function"
            );
        }
        self.tasks.push(call);
        self.tasks.len()
    }

    pub fn group(&self) -> &GroupId {
        &self.group
    }

    pub fn run(&mut self) -> GroupId {
        if self.started {
            tracing::warn!(group = %self.group, "chain already started");
            return self.group.clone();
        }
        self.started = true;
        let tasks = self.tasks.clone();
        if self.options.sync {
            self.broker.run_inline(self.group.clone(), tasks, self.options.cached);
        } else {
            self.broker.submit_chain(self.group.clone(), tasks, self.options.cached);
        }
        self.group.clone()
    }

    /// Runs the chain if needed, then waits up to `wait` for every task.
    /// `None` if the chain has not finished in time.
    pub fn result(&mut self, wait: Duration) -> Option<Vec<TaskOutcome>> {
        if !self.started {
            self.run();
        }
        self.broker
            .wait_for(&self.group, self.length(), wait)
            .map(|records| records.iter().map(TaskRecord::outcome).collect())
    }

    /// Index of the task running or queued next; `None` before `run` and
    /// after the last task finished.
    pub fn current(&self) -> Option<usize> {
        if !self.started {
            return None;
        }
        let done = self.broker.records(&self.group).len();
        (done < self.length()).then_some(done)
    }

    pub fn length(&self) -> usize {
        self.tasks.len()
    }

    pub fn fetch(&self, failures_only: bool) -> Vec<TaskRecord> {
        self.broker
            .records(&self.group)
            .into_iter()
            .filter(|record| !failures_only || !record.success)
            .collect()
    }
}
