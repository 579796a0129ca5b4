use crate::registry::{render_args, Registry, TaskError};
use chrono::{DateTime, Utc};
use crossbeam::channel::{self, Receiver, Sender};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub type TaskOutcome = Result<f64, TaskError>;

/// Name shared by every task of a chain. Random unless the caller picks one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupId(String);

impl GroupId {
    pub fn random() -> Self {
        GroupId(Uuid::new_v4().simple().to_string())
    }

    pub fn named(name: impl Into<String>) -> Self {
        GroupId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One task to run: dotted function name plus positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCall {
    pub func: String,
    pub args: Vec<f64>,
}

impl TaskCall {
    pub fn new(func: impl Into<String>, args: &[f64]) -> Self {
        Self {
            func: func.into(),
            args: args.to_vec(),
        }
    }
}

/// What the broker remembers about a finished task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub id: Uuid,
    pub group: GroupId,
    pub index: usize,
    pub func: String,
    pub args: Vec<f64>,
    pub started: DateTime<Utc>,
    pub stopped: DateTime<Utc>,
    pub success: bool,
    pub result: Option<f64>,
    pub error: Option<TaskError>,
}

impl TaskRecord {
    pub fn outcome(&self) -> TaskOutcome {
        match (&self.result, &self.error) {
            (Some(value), _) => Ok(*value),
            (None, Some(err)) => Err(err.clone()),
            (None, None) => Err(TaskError::UnknownFunction(self.func.clone())),
        }
    }
}

impl fmt::Display for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}({}) ", self.index, self.func, render_args(&self.args))?;
        match self.outcome() {
            Ok(value) => write!(f, "= {}", value),
            Err(err) => write!(f, "failed: {}", err),
        }
    }
}

// =============================================================================
// Result store
// =============================================================================

struct CachedGroup {
    expires: Instant,
    records: Vec<TaskRecord>,
}

/// Durable results live until the broker goes away; cached ones expire
/// `ttl` after the group's last write.
pub struct ResultStore {
    durable: DashMap<GroupId, Vec<TaskRecord>>,
    cache: DashMap<GroupId, CachedGroup>,
    ttl: Duration,
}

impl ResultStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            durable: DashMap::new(),
            cache: DashMap::new(),
            ttl,
        }
    }

    pub fn save(&self, record: TaskRecord, cached: bool) {
        let group = record.group.clone();
        if cached {
            let expires = Instant::now() + self.ttl;
            let mut entry = self.cache.entry(group).or_insert_with(|| CachedGroup {
                expires,
                records: Vec::new(),
            });
            entry.expires = expires;
            entry.records.push(record);
        } else {
            self.durable.entry(group).or_default().push(record);
        }
    }

    /// Records for `group` in the order they finished.
    pub fn records(&self, group: &GroupId) -> Vec<TaskRecord> {
        let now = Instant::now();
        self.cache.remove_if(group, |_, cached| cached.expires <= now);

        let mut records = self
            .durable
            .get(group)
            .map(|r| r.value().clone())
            .unwrap_or_default();
        if let Some(cached) = self.cache.get(group) {
            records.extend(cached.records.iter().cloned());
        }
        records
    }

    pub fn count(&self, group: &GroupId) -> usize {
        self.records(group).len()
    }
}

// =============================================================================
// Jobs and workers
// =============================================================================

struct Job {
    group: GroupId,
    index: usize,
    task: TaskCall,
    rest: VecDeque<TaskCall>,
    cached: bool,
}

impl Job {
    fn first(group: GroupId, mut tasks: VecDeque<TaskCall>, cached: bool) -> Option<Job> {
        let task = tasks.pop_front()?;
        Some(Job {
            group,
            index: 0,
            task,
            rest: tasks,
            cached,
        })
    }

    fn next(mut self) -> Option<Job> {
        let task = self.rest.pop_front()?;
        Some(Job {
            index: self.index + 1,
            task,
            ..self
        })
    }
}

struct Shared {
    registry: Registry,
    store: ResultStore,
}

impl Shared {
    /// Runs one task, stores its record, and hands back the chain's next job.
    fn execute(&self, job: Job) -> Option<Job> {
        let started = Utc::now();
        let outcome = self.registry.call(&job.task.func, &job.task.args);
        let stopped = Utc::now();

        match &outcome {
            Ok(value) => tracing::info!(
                group = %job.group,
                index = job.index,
                func = %job.task.func,
                value,
                "task succeeded"
            ),
            Err(err) => tracing::warn!(
                group = %job.group,
                index = job.index,
                func = %job.task.func,
                error = %err,
                "task failed"
            ),
        }

        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err)),
        };
        self.store.save(
            TaskRecord {
                id: Uuid::new_v4(),
                group: job.group.clone(),
                index: job.index,
                func: job.task.func.clone(),
                args: job.task.args.clone(),
                started,
                stopped,
                success: error.is_none(),
                result,
                error,
            },
            job.cached,
        );
        job.next()
    }
}

fn worker_loop(id: usize, shared: Arc<Shared>, jobs: Receiver<Job>, requeue: Weak<Sender<Job>>) {
    tracing::debug!(worker = id, "worker started");
    for job in jobs.iter() {
        let Some(next) = shared.execute(job) else {
            continue;
        };
        match requeue.upgrade() {
            Some(sender) => {
                if sender.send(next).is_err() {
                    tracing::warn!(worker = id, "queue closed; chain abandoned");
                }
            }
            None => tracing::warn!(worker = id, "broker dropped; chain abandoned"),
        }
    }
    tracing::debug!(worker = id, "worker stopped");
}

// =============================================================================
// Broker
// =============================================================================

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub workers: usize,
    /// Lifetime of results written by cached chains.
    pub cache_ttl: Duration,
    /// How long `result_group` waits for the requested count.
    pub group_wait: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            cache_ttl: Duration::from_secs(60),
            group_wait: Duration::from_secs(10),
        }
    }
}

/// Worker cluster plus result store. Dropping it closes the queue and joins
/// the workers.
pub struct Broker {
    shared: Arc<Shared>,
    sender: Option<Arc<Sender<Job>>>,
    workers: Vec<JoinHandle<()>>,
    config: BrokerConfig,
}

impl Broker {
    pub fn new(config: BrokerConfig, registry: Registry) -> io::Result<Self> {
        let shared = Arc::new(Shared {
            registry,
            store: ResultStore::new(config.cache_ttl),
        });
        let (tx, rx) = channel::unbounded::<Job>();
        let sender = Arc::new(tx);

        let workers = (0..config.workers.max(1))
            .map(|id| {
                let shared = Arc::clone(&shared);
                let jobs = rx.clone();
                let requeue = Arc::downgrade(&sender);
                thread::Builder::new()
                    .name(format!("task-worker-{}", id))
                    .spawn(move || worker_loop(id, shared, jobs, requeue))
            })
            .collect::<io::Result<Vec<_>>>()?;

        tracing::info!(workers = workers.len(), "broker started");
        Ok(Self {
            shared,
            sender: Some(sender),
            workers,
            config,
        })
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Whether the registry has a task function called `func`.
    pub fn knows(&self, func: &str) -> bool {
        self.shared.registry.contains(func)
    }

    /// Queues the first task; each later task is queued when its predecessor
    /// finishes.
    pub fn submit_chain(&self, group: GroupId, tasks: Vec<TaskCall>, cached: bool) {
        let Some(job) = Job::first(group, tasks.into(), cached) else {
            return;
        };
        let Some(sender) = &self.sender else {
            return;
        };
        tracing::debug!(group = %job.group, tasks = job.rest.len() + 1, "chain submitted");
        if sender.send(job).is_err() {
            tracing::warn!("queue closed; chain not submitted");
        }
    }

    /// Runs the chain on the calling thread.
    pub fn run_inline(&self, group: GroupId, tasks: Vec<TaskCall>, cached: bool) {
        let mut job = Job::first(group, tasks.into(), cached);
        while let Some(current) = job {
            job = self.shared.execute(current);
        }
    }

    pub fn records(&self, group: &GroupId) -> Vec<TaskRecord> {
        self.shared.store.records(group)
    }

    /// Polls until `group` has at least `count` records or `wait` elapses.
    pub fn wait_for(
        &self,
        group: &GroupId,
        count: usize,
        wait: Duration,
    ) -> Option<Vec<TaskRecord>> {
        let deadline = Instant::now() + wait;
        loop {
            let records = self.records(group);
            if records.len() >= count {
                return Some(records);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for Broker {
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
        tracing::info!("broker stopped");
    }
}

// =============================================================================
// Free functions
// =============================================================================

/// Submits `tasks` as a chain under a fresh group id.
pub fn async_chain(broker: &Broker, tasks: Vec<TaskCall>) -> GroupId {
    let group = GroupId::random();
    broker.submit_chain(group.clone(), tasks, false);
    group
}

/// Outcomes for `group` in chain order, once at least `count` exist.
pub fn result_group(broker: &Broker, group: &GroupId, count: usize) -> Option<Vec<TaskOutcome>> {
    broker
        .wait_for(group, count, broker.config().group_wait)
        .map(|records| records.iter().map(TaskRecord::outcome).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broker(workers: usize) -> Broker {
        let config = BrokerConfig {
            workers,
            cache_ttl: Duration::from_secs(60),
            group_wait: Duration::from_secs(5),
        };
        Broker::new(config, Registry::with_math()).unwrap()
    }

    #[test]
    fn test_async_chain_results_in_order() {
        let broker = broker(2);
        let group = async_chain(
            &broker,
            vec![
                TaskCall::new("math.copysign", &[1.0, -1.0]),
                TaskCall::new("math.floor", &[1.0]),
            ],
        );
        let results = result_group(&broker, &group, 2).unwrap();
        assert_eq!(results, vec![Ok(-1.0), Ok(1.0)]);
    }

    #[test]
    fn test_tasks_run_one_after_another() {
        let broker = broker(4);
        let tasks = (0..8).map(|i| TaskCall::new("math.fabs", &[-(i as f64)])).collect();
        let group = async_chain(&broker, tasks);
        let records = broker.wait_for(&group, 8, Duration::from_secs(5)).unwrap();

        let indices: Vec<usize> = records.iter().map(|r| r.index).collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
        for pair in records.windows(2) {
            assert!(pair[1].started >= pair[0].stopped);
        }
    }

    #[test]
    fn test_failure_recorded_and_chain_continues() {
        let broker = broker(1);
        let group = async_chain(
            &broker,
            vec![
                TaskCall::new("math.sqrt", &[-1.0]),
                TaskCall::new("math.nope", &[1.0]),
                TaskCall::new("math.sqrt", &[9.0]),
            ],
        );
        let records = broker.wait_for(&group, 3, Duration::from_secs(5)).unwrap();
        assert!(!records[0].success);
        assert!(matches!(records[0].error, Some(TaskError::Domain { .. })));
        assert_eq!(records[1].error, Some(TaskError::UnknownFunction("math.nope".into())));
        assert_eq!(records[2].outcome(), Ok(3.0));
    }

    #[test]
    fn test_result_group_times_out() {
        let config = BrokerConfig {
            workers: 1,
            cache_ttl: Duration::from_secs(1),
            group_wait: Duration::from_millis(50),
        };
        let broker = Broker::new(config, Registry::with_math()).unwrap();
        assert_eq!(result_group(&broker, &GroupId::named("missing"), 1), None);
    }

    #[test]
    fn test_empty_chain_submits_nothing() {
        let broker = broker(1);
        let group = async_chain(&broker, Vec::new());
        assert_eq!(result_group(&broker, &group, 0), Some(Vec::new()));
    }

    #[test]
    fn test_run_inline_is_synchronous() {
        let broker = broker(1);
        let group = GroupId::named("inline");
        broker.run_inline(
            group.clone(),
            vec![
                TaskCall::new("math.pow", &[2.0, 3.0]),
                TaskCall::new("math.sqrt", &[-4.0]),
            ],
            false,
        );
        let records = broker.records(&group);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcome(), Ok(8.0));
        assert!(!records[1].success);
    }

    #[test]
    fn test_cached_results_expire() {
        let store = ResultStore::new(Duration::from_millis(30));
        let group = GroupId::named("short-lived");
        let now = Utc::now();
        store.save(
            TaskRecord {
                id: Uuid::new_v4(),
                group: group.clone(),
                index: 0,
                func: "math.fabs".into(),
                args: vec![-1.0],
                started: now,
                stopped: now,
                success: true,
                result: Some(1.0),
                error: None,
            },
            true,
        );
        assert_eq!(store.count(&group), 1);
        thread::sleep(Duration::from_millis(60));
        assert_eq!(store.count(&group), 0);
    }

    #[test]
    fn test_group_ids() {
        assert_ne!(GroupId::random(), GroupId::random());
        assert_eq!(GroupId::random().as_str().len(), 32);
        assert_eq!(GroupId::named("math_operations").to_string(), "math_operations");
    }

    #[test]
    fn test_drop_joins_workers() {
        let broker = broker(3);
        assert_eq!(broker.worker_count(), 3);
        let group = async_chain(&broker, vec![TaskCall::new("math.floor", &[2.5])]);
        assert!(result_group(&broker, &group, 1).is_some());
        drop(broker);
    }
}
