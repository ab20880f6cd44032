//! Reference-counted color pair allocator
//!
//! Maps a [`ColorKey`] onto a numbered terminal color pair slot. Identical
//! keys share a slot, slots are freed as soon as the last [`ColorPair`]
//! handle goes away, and new slots always take the lowest free index.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};
use thiserror::Error;

use crate::color::{ColorKey, ColorValue};
use crate::term::PairBinder;

/// First slot available for allocation; lower slots belong to the terminal
pub const RESERVED_BASE: u32 = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("Too many colors: {index} / {capacity}")]
    Exhausted { index: u32, capacity: u32 },
    #[error("Color pair {index} does not belong to this allocator")]
    ForeignPair { index: u32 },
    #[error("Color pair {index} is no longer allocated")]
    StalePair { index: u32 },
}

/// A release that was refused; the handle comes back untouched
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ReleaseError {
    pub error: AllocError,
    pub pair: ColorPair,
}

impl ReleaseError {
    /// Take the handle back, e.g. to release it through its own allocator
    pub fn into_pair(self) -> ColorPair {
        self.pair
    }
}

/// Snapshot of a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairInfo {
    pub key: ColorKey,
    pub index: u32,
    pub share_count: usize,
    /// Whether the binder accepted the pair when it was created
    pub bound: bool,
}

impl fmt::Display for PairInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (rc {}{})",
            self.index,
            self.key,
            self.share_count,
            if self.bound { "" } else { ", unbound" }
        )
    }
}

#[derive(Debug)]
struct Entry {
    key: ColorKey,
    index: u32,
    share_count: usize,
    serial: u64,
    bound: bool,
}

impl Entry {
    fn info(&self) -> PairInfo {
        PairInfo {
            key: self.key,
            index: self.index,
            share_count: self.share_count,
            bound: self.bound,
        }
    }
}

/// Entries sorted by ascending index, unique by key and by index
#[derive(Debug, Default)]
struct Registry {
    entries: Vec<Entry>,
    next_serial: u64,
}

impl Registry {
    fn find(&self, key: &ColorKey) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == *key)
    }

    fn position(&self, serial: u64) -> Option<usize> {
        self.entries.iter().position(|e| e.serial == serial)
    }

    /// Smallest index not taken, starting at `RESERVED_BASE`
    fn lowest_free_index(&self) -> u32 {
        let mut index = RESERVED_BASE;
        for entry in &self.entries {
            if entry.index == index {
                index += 1;
            } else {
                break;
            }
        }
        index
    }

    fn insert(&mut self, key: ColorKey, index: u32, bound: bool) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;

        let pos = self.entries.partition_point(|e| e.index < index);
        debug_assert!(self.entries.get(pos).map_or(true, |e| e.index != index));
        self.entries.insert(
            pos,
            Entry {
                key,
                index,
                share_count: 1,
                serial,
                bound,
            },
        );
        serial
    }

    /// Add an owner to a live entry
    fn retain(&mut self, serial: u64) -> bool {
        match self.position(serial) {
            Some(pos) => {
                self.entries[pos].share_count += 1;
                true
            }
            None => false,
        }
    }

    /// Drop an owner; the entry is removed when the last one goes
    fn release(&mut self, serial: u64) {
        let Some(pos) = self.position(serial) else {
            trace!("release of inert color pair handle");
            return;
        };

        let entry = &mut self.entries[pos];
        if entry.share_count > 1 {
            entry.share_count -= 1;
            debug!("color pair rc--: {}", entry.info());
            return;
        }

        let entry = self.entries.remove(pos);
        debug!("color pair free: {}", entry.info());
        debug!("color pairs in use: {}", self.entries.len());
    }
}

/// Shared ownership of one allocated color pair.
///
/// Cloning adds an owner. Dropping the last clone frees the slot right
/// away, so a following `acquire` sees the index as available.
#[derive(Debug)]
pub struct ColorPair {
    key: ColorKey,
    index: u32,
    serial: u64,
    registry: Weak<RefCell<Registry>>,
}

impl ColorPair {
    pub fn key(&self) -> ColorKey {
        self.key
    }

    /// Slot number the pair is bound to
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Current number of owners, or 0 once the allocator has torn down
    pub fn share_count(&self) -> usize {
        self.registry
            .upgrade()
            .and_then(|registry| {
                let registry = registry.borrow();
                registry
                    .position(self.serial)
                    .map(|pos| registry.entries[pos].share_count)
            })
            .unwrap_or(0)
    }

    pub fn is_live(&self) -> bool {
        self.share_count() > 0
    }
}

impl Clone for ColorPair {
    fn clone(&self) -> Self {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            if registry.retain(self.serial) {
                if let Some(pos) = registry.position(self.serial) {
                    debug!("color pair rc++: {}", registry.entries[pos].info());
                }
            }
        }

        Self {
            key: self.key,
            index: self.index,
            serial: self.serial,
            registry: self.registry.clone(),
        }
    }
}

impl Drop for ColorPair {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        match registry.try_borrow_mut() {
            Ok(mut registry) => registry.release(self.serial),
            Err(_) => {
                warn!("color pair {} dropped while registry is busy", self.index);
                debug_assert!(
                    false,
                    "color pair {} dropped while registry is busy",
                    self.index
                );
            }
        };
    }
}

/// Hands out color pair slots for `(fg, bg)` keys.
///
/// Single-threaded: the registry is shared with outstanding [`ColorPair`]
/// handles through `Rc`, so neither the allocator nor its handles are `Send`.
pub struct ColorPairAllocator<B: PairBinder> {
    binder: B,
    capacity: u32,
    registry: Rc<RefCell<Registry>>,
    warned: bool,
    warnings: Vec<String>,
}

impl<B: PairBinder> ColorPairAllocator<B> {
    /// Create an empty allocator; the pair budget is read from the binder once
    pub fn new(binder: B) -> Self {
        let capacity = binder.capacity();
        debug!("init color pairs, capacity {}", capacity);
        Self {
            binder,
            capacity,
            registry: Rc::new(RefCell::new(Registry::default())),
            warned: false,
            warnings: Vec::new(),
        }
    }

    /// Reset to the freshly created state
    pub fn init(&mut self) {
        self.teardown();
        self.warned = false;
        self.warnings.clear();
    }

    /// Drop every entry regardless of owners.
    ///
    /// Handles still alive afterwards are inert: cloning or dropping them
    /// does nothing and `release` reports them as stale.
    pub fn teardown(&mut self) {
        let mut registry = self.registry.borrow_mut();
        debug!("teardown: freeing {} color pairs", registry.entries.len());
        registry.entries.clear();
    }

    /// Get a color pair for `(fg, bg)`.
    ///
    /// Returns `Ok(None)` when the key asks for no color at all (both sides
    /// unset, or both default). An existing pair for the same key is
    /// shared. A bind failure is logged but the slot is still allocated.
    pub fn acquire(
        &mut self,
        fg: impl Into<ColorValue>,
        bg: impl Into<ColorValue>,
    ) -> Result<Option<ColorPair>, AllocError> {
        let key = ColorKey::new(fg, bg);
        debug!("acquire {}", key);

        if key.is_no_color() {
            debug!("no color requested");
            return Ok(None);
        }

        if let Some(pair) = self.share(&key) {
            return Ok(Some(pair));
        }

        let index = self.registry.borrow().lowest_free_index();
        debug!("lowest index = {}", index);
        if index >= self.capacity {
            return Err(self.exhausted(index));
        }

        let bound = self.bind(index, &key);
        let serial = self.registry.borrow_mut().insert(key, index, bound);
        let pair = self.handle(key, index, serial);
        debug!(
            "color pair new: [{}] {}, in use: {}",
            index,
            key,
            self.len()
        );
        Ok(Some(pair))
    }

    /// Give up one owner of `pair`.
    ///
    /// Dropping a handle does the same thing; this variant also checks the
    /// handle came from this allocator and still refers to a live entry.
    /// A handle that fails either check is returned in the error and no
    /// registry is touched.
    pub fn release(&self, pair: ColorPair) -> Result<(), ReleaseError> {
        let index = pair.index;
        if !std::ptr::eq(pair.registry.as_ptr(), Rc::as_ptr(&self.registry)) {
            return Err(ReleaseError {
                error: AllocError::ForeignPair { index },
                pair,
            });
        }
        if self.registry.borrow().position(pair.serial).is_none() {
            return Err(ReleaseError {
                error: AllocError::StalePair { index },
                pair,
            });
        }
        drop(pair);
        Ok(())
    }

    /// Look up the entry for `(fg, bg)` without touching it
    pub fn find(&self, fg: impl Into<ColorValue>, bg: impl Into<ColorValue>) -> Option<PairInfo> {
        let key = ColorKey::new(fg, bg);
        self.registry.borrow().find(&key).map(Entry::info)
    }

    /// Slots still available for new keys
    pub fn capacity_remaining(&self) -> u32 {
        let used = u32::try_from(self.len()).unwrap_or(u32::MAX);
        self.capacity
            .saturating_sub(RESERVED_BASE)
            .saturating_sub(used)
    }

    /// Total pair budget, reserved slots included
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live entries in index order
    pub fn dump(&self) -> Vec<PairInfo> {
        let registry = self.registry.borrow();
        let infos: Vec<PairInfo> = registry.entries.iter().map(Entry::info).collect();
        for info in &infos {
            debug!("color pair: {}", info);
        }
        infos
    }

    /// User-facing warnings raised since the last call
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    pub fn binder(&self) -> &B {
        &self.binder
    }

    fn share(&self, key: &ColorKey) -> Option<ColorPair> {
        let serial = self.registry.borrow().find(key)?.serial;
        let mut registry = self.registry.borrow_mut();
        registry.retain(serial);
        let pos = registry.position(serial)?;
        let entry = &registry.entries[pos];
        debug!("color pair rc++: {}", entry.info());
        Some(self.handle(entry.key, entry.index, serial))
    }

    fn bind(&mut self, index: u32, key: &ColorKey) -> bool {
        let normalized = key.normalized();
        match self.binder.bind(index, normalized.fg, normalized.bg) {
            Ok(()) => {
                debug!("bind({}, {}) ok", index, normalized);
                true
            }
            Err(err) => {
                warn!("bind({}, {}) failed: {}", index, normalized, err);
                false
            }
        }
    }

    /// Build the exhaustion error, warning the user only the first time
    fn exhausted(&mut self, index: u32) -> AllocError {
        let err = AllocError::Exhausted {
            index,
            capacity: self.capacity,
        };
        if !self.warned {
            warn!("{}", err);
            self.warnings.push(err.to_string());
            self.warned = true;
        }
        err
    }

    fn handle(&self, key: ColorKey, index: u32, serial: u64) -> ColorPair {
        ColorPair {
            key,
            index,
            serial,
            registry: Rc::downgrade(&self.registry),
        }
    }
}

impl<B: PairBinder + fmt::Debug> fmt::Debug for ColorPairAllocator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorPairAllocator")
            .field("binder", &self.binder)
            .field("capacity", &self.capacity)
            .field("entries", &self.registry.borrow().entries)
            .field("warned", &self.warned)
            .finish()
    }
}
