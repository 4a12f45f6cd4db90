//! Connection pool
//!
//! Caches idle connections per user so that repeated work against one host
//! does not repeat the handshake. The pool tracks two sets:
//!
//! - **free**: idle connections keyed by user, ready for [`ConnectionPool::checkout`]
//! - **used**: connections handed out and not yet checked back in
//!
//! All bookkeeping happens under one lock. The close family takes its
//! connections out of the bookkeeping first and closes them after the lock
//! is released, so a slow host never blocks other pool users.

use crate::connection::Connection;
use hostserver_core::SystemInfo;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct PoolState {
    free: HashMap<String, HashMap<u64, Arc<Connection>>>,
    used: HashMap<u64, Arc<Connection>>,
    free_count: usize,
    used_count: usize,
}

impl PoolState {
    fn evict(&mut self, conn: &Connection) {
        if let Some(set) = self.free.get_mut(conn.user()) {
            if set.remove(&conn.id()).is_some() {
                self.free_count -= 1;
            }
            if set.is_empty() {
                self.free.remove(conn.user());
            }
        }
        if self.used.remove(&conn.id()).is_some() {
            self.used_count -= 1;
        }
    }

    fn take_free(&mut self, user: Option<&str>) -> Vec<Arc<Connection>> {
        let taken: Vec<Arc<Connection>> = match user {
            Some(user) => self
                .free
                .remove(user)
                .map(|set| set.into_values().collect())
                .unwrap_or_default(),
            None => self
                .free
                .drain()
                .flat_map(|(_, set)| set.into_values())
                .collect(),
        };
        self.free_count -= taken.len();
        taken
    }

    fn take_used(&mut self, user: Option<&str>) -> Vec<Arc<Connection>> {
        let ids: Vec<u64> = self
            .used
            .values()
            .filter(|conn| user.is_none_or(|user| conn.user() == user))
            .map(|conn| conn.id())
            .collect();
        let taken: Vec<Arc<Connection>> =
            ids.iter().filter_map(|id| self.used.remove(id)).collect();
        self.used_count -= taken.len();
        taken
    }
}

/// Idle connection cache for one host
#[derive(Debug)]
pub struct ConnectionPool {
    info: SystemInfo,
    state: Mutex<PoolState>,
}

/// Pool key for a user name as the caller typed it
fn user_key(user: &str) -> String {
    user.trim().to_uppercase()
}

impl ConnectionPool {
    /// Empty pool accepting connections to the host described by `info`
    pub fn new(info: SystemInfo) -> Self {
        Self {
            info,
            state: Mutex::new(PoolState::default()),
        }
    }

    pub fn system_info(&self) -> &SystemInfo {
        &self.info
    }

    fn state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return a connection to the pool
    ///
    /// An open connection to this pool's system becomes free for its user.
    /// A closed connection, or one to another system, is dropped from the
    /// pool instead.
    pub fn checkin(&self, conn: Arc<Connection>) {
        let mut state = self.state();
        if conn.is_closed() || conn.info() != &self.info {
            log::debug!("Evicting connection {} on checkin", conn.id());
            state.evict(&conn);
            return;
        }

        if state.used.remove(&conn.id()).is_some() {
            state.used_count -= 1;
        }
        let set = state.free.entry(conn.user().to_string()).or_default();
        if set.insert(conn.id(), conn).is_none() {
            state.free_count += 1;
        }
    }

    /// Take a free connection for `user`, if there is one
    ///
    /// Connections that were closed while idle are dropped on the way.
    pub fn checkout(&self, user: &str) -> Option<Arc<Connection>> {
        let key = user_key(user);
        let mut state = self.state();
        loop {
            let set = state.free.get_mut(&key)?;
            let id = set.keys().next().copied();
            let conn = id.and_then(|id| set.remove(&id));
            if set.is_empty() {
                state.free.remove(&key);
            }
            let conn = conn?;
            state.free_count -= 1;

            if conn.is_closed() {
                log::debug!("Dropping closed connection {} at checkout", conn.id());
                continue;
            }
            state.used.insert(conn.id(), Arc::clone(&conn));
            state.used_count += 1;
            return Some(conn);
        }
    }

    /// Forget a connection without closing it
    pub fn remove(&self, conn: &Connection) {
        self.state().evict(conn);
    }

    /// Close every connection in the pool
    pub fn close(&self) {
        let taken = {
            let mut state = self.state();
            let mut taken = state.take_free(None);
            taken.extend(state.take_used(None));
            taken
        };
        close_all(taken);
    }

    pub fn close_free(&self) {
        let taken = self.state().take_free(None);
        close_all(taken);
    }

    pub fn close_used(&self) {
        let taken = self.state().take_used(None);
        close_all(taken);
    }

    /// Close every connection belonging to `user`
    pub fn close_for(&self, user: &str) {
        let key = user_key(user);
        let taken = {
            let mut state = self.state();
            let mut taken = state.take_free(Some(&key));
            taken.extend(state.take_used(Some(&key)));
            taken
        };
        close_all(taken);
    }

    pub fn close_free_for(&self, user: &str) {
        let taken = self.state().take_free(Some(&user_key(user)));
        close_all(taken);
    }

    pub fn close_used_for(&self, user: &str) {
        let taken = self.state().take_used(Some(&user_key(user)));
        close_all(taken);
    }

    pub fn connection_count(&self) -> usize {
        let state = self.state();
        state.free_count + state.used_count
    }

    pub fn free_connection_count(&self) -> usize {
        self.state().free_count
    }

    pub fn used_connection_count(&self) -> usize {
        self.state().used_count
    }

    pub fn connection_count_for(&self, user: &str) -> usize {
        self.free_connection_count_for(user) + self.used_connection_count_for(user)
    }

    pub fn free_connection_count_for(&self, user: &str) -> usize {
        self.state()
            .free
            .get(&user_key(user))
            .map_or(0, HashMap::len)
    }

    pub fn used_connection_count_for(&self, user: &str) -> usize {
        let key = user_key(user);
        self.state()
            .used
            .values()
            .filter(|conn| conn.user() == key)
            .count()
    }

    /// Users with at least one pooled connection, sorted
    pub fn users(&self) -> Vec<String> {
        let state = self.state();
        let mut users: Vec<String> = state
            .free
            .keys()
            .cloned()
            .chain(state.used.values().map(|conn| conn.user().to_string()))
            .collect();
        users.sort();
        users.dedup();
        users
    }
}

/// Close each connection; one failure does not stop the rest
fn close_all(connections: Vec<Arc<Connection>>) {
    for conn in connections {
        if let Err(e) = conn.close() {
            log::warn!("Closing pooled connection {} failed: {}", conn.id(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::tests::{in_memory, system_info};
    use crate::service::Service;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn pool() -> ConnectionPool {
        ConnectionPool::new(system_info())
    }

    fn connection(user: &str) -> Arc<Connection> {
        Arc::new(in_memory(Service::RemoteCommand, user))
    }

    fn assert_consistent(pool: &ConnectionPool) {
        let state = pool.state();
        let free_ids: HashSet<u64> = state
            .free
            .values()
            .flat_map(|set| set.keys().copied())
            .collect();
        let used_ids: HashSet<u64> = state.used.keys().copied().collect();
        assert_eq!(state.free_count, free_ids.len());
        assert_eq!(state.used_count, used_ids.len());
        assert!(free_ids.is_disjoint(&used_ids));
        assert!(state.free.values().all(|set| !set.is_empty()));
        for (user, set) in &state.free {
            assert!(set.values().all(|conn| conn.user() == user.as_str()));
        }
    }

    #[test]
    fn test_checkout_is_exclusive() {
        let pool = pool();
        let conn = connection("QSECOFR");
        pool.checkin(Arc::clone(&conn));

        let first = pool.checkout("qsecofr").unwrap();
        assert_eq!(first.id(), conn.id());
        assert!(pool.checkout("QSECOFR").is_none());
        assert_eq!(pool.used_connection_count(), 1);
        assert_eq!(pool.free_connection_count(), 0);
    }

    #[test]
    fn test_checkin_moves_used_to_free() {
        let pool = pool();
        let conn = connection("QSECOFR");
        pool.checkin(Arc::clone(&conn));
        let conn = pool.checkout("QSECOFR").unwrap();
        pool.checkin(conn);

        assert_eq!(pool.free_connection_count_for("QSECOFR"), 1);
        assert_eq!(pool.used_connection_count_for("QSECOFR"), 0);
        assert_eq!(pool.connection_count(), 1);
        assert_consistent(&pool);
    }

    #[test]
    fn test_checkin_evicts_closed_and_foreign() {
        let pool = pool();
        let conn = connection("QSECOFR");
        pool.checkin(Arc::clone(&conn));
        conn.close().unwrap();
        pool.checkin(Arc::clone(&conn));
        assert_eq!(pool.connection_count(), 0);

        let foreign = ConnectionPool::new(system_info().with_server_ccsid(273));
        foreign.checkin(connection("QSECOFR"));
        assert_eq!(foreign.connection_count(), 0);
        assert!(foreign.users().is_empty());
    }

    #[test]
    fn test_checkout_skips_closed() {
        let pool = pool();
        let closed = connection("USER1");
        pool.checkin(Arc::clone(&closed));
        closed.close().unwrap();

        assert!(pool.checkout("USER1").is_none());
        assert_eq!(pool.connection_count(), 0);
        assert_consistent(&pool);
    }

    #[test]
    fn test_remove_does_not_close() {
        let pool = pool();
        let conn = connection("QSECOFR");
        pool.checkin(Arc::clone(&conn));
        pool.remove(&conn);
        assert_eq!(pool.connection_count(), 0);
        assert!(!conn.is_closed());
    }

    #[test]
    fn test_close_family() {
        let pool = pool();
        let a_free = connection("A");
        let a_used = connection("A");
        let b_free = connection("B");
        let b_used = connection("B");
        for conn in [&a_free, &a_used, &b_free, &b_used] {
            pool.checkin(Arc::clone(conn));
        }
        pool.checkout("A");
        pool.checkout("B");
        assert_eq!(pool.users(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(pool.connection_count_for("a"), 2);

        pool.close_used_for("A");
        assert_eq!(pool.used_connection_count_for("A"), 0);
        assert_eq!(pool.free_connection_count_for("A"), 1);

        pool.close_free();
        assert_eq!(pool.free_connection_count(), 0);
        assert_eq!(pool.used_connection_count(), 1);

        pool.close();
        assert_eq!(pool.connection_count(), 0);
        assert!(pool.users().is_empty());
        assert!([a_free, a_used, b_free, b_used].iter().all(|conn| conn.is_closed()));
    }

    #[test]
    fn test_close_for_user() {
        let pool = pool();
        let a = connection("A");
        let b = connection("B");
        pool.checkin(Arc::clone(&a));
        pool.checkin(Arc::clone(&b));
        pool.close_for("a");
        assert!(a.is_closed());
        assert!(!b.is_closed());
        assert_eq!(pool.users(), vec!["B".to_string()]);

        pool.close_free_for("B");
        assert!(b.is_closed());
        assert_eq!(pool.connection_count(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Checkin(usize),
        Checkout(usize),
        Remove(usize),
        Close(usize),
        CloseUsedFor(usize),
    }

    const USERS: [&str; 3] = ["ALICE", "BOB", "CAROL"];

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..8usize).prop_map(Op::Checkin),
            (0..USERS.len()).prop_map(Op::Checkout),
            (0..8usize).prop_map(Op::Remove),
            (0..8usize).prop_map(Op::Close),
            (0..USERS.len()).prop_map(Op::CloseUsedFor),
        ]
    }

    proptest! {
        #[test]
        fn test_counts_match_sets(ops in prop::collection::vec(op(), 1..64)) {
            let pool = pool();
            let connections: Vec<Arc<Connection>> =
                (0..8).map(|i| connection(USERS[i % USERS.len()])).collect();

            for op in ops {
                match op {
                    Op::Checkin(i) => pool.checkin(Arc::clone(&connections[i])),
                    Op::Checkout(u) => {
                        if let Some(conn) = pool.checkout(USERS[u]) {
                            prop_assert_eq!(conn.user(), USERS[u]);
                            prop_assert!(!conn.is_closed());
                        }
                    }
                    Op::Remove(i) => pool.remove(&connections[i]),
                    Op::Close(i) => {
                        connections[i].close().unwrap();
                    }
                    Op::CloseUsedFor(u) => pool.close_used_for(USERS[u]),
                }

                assert_consistent(&pool);
                prop_assert_eq!(
                    pool.free_connection_count() + pool.used_connection_count(),
                    pool.connection_count()
                );
                let per_user: usize = USERS.iter().map(|u| pool.connection_count_for(u)).sum();
                prop_assert_eq!(per_user, pool.connection_count());
            }
        }
    }
}
