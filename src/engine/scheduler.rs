/// Speed-weighted round robin.
///
/// Every scheduled item waits `1 / speed` time units between turns, so an item
/// twice as fast acts twice as often. Items due at the same instant act in the
/// order they were queued.
#[derive(Clone, Debug)]
pub struct SpeedScheduler<T> {
    queue: Vec<Pending<T>>,
    repeat: Vec<(T, u32)>,
    current: Option<T>,
    time: f64,
}

#[derive(Clone, Debug)]
struct Pending<T> {
    at: f64,
    item: T,
}

fn duration(speed: u32) -> f64 {
    1.0 / f64::from(speed.max(1))
}

impl<T: Copy + PartialEq> Default for SpeedScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq> SpeedScheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            repeat: Vec::new(),
            current: None,
            time: 0.0,
        }
    }

    pub fn add(&mut self, item: T, speed: u32, repeat: bool) {
        if repeat {
            self.repeat.push((item, speed));
        }
        self.enqueue(item, duration(speed));
    }

    fn enqueue(&mut self, item: T, delay: f64) {
        let at = self.time + delay;
        let index = self.queue.partition_point(|pending| pending.at <= at);
        self.queue.insert(index, Pending { at, item });
    }

    pub fn remove(&mut self, item: T) -> bool {
        let queued = self.queue.len();
        self.queue.retain(|pending| pending.item != item);
        let repeated = self.repeat.len();
        self.repeat.retain(|(entry, _)| *entry != item);
        if self.current == Some(item) {
            self.current = None;
        }
        queued != self.queue.len() || repeated != self.repeat.len()
    }

    pub fn next(&mut self) -> Option<T> {
        if let Some(current) = self.current.take() {
            if let Some(&(_, speed)) = self.repeat.iter().find(|(entry, _)| *entry == current) {
                self.enqueue(current, duration(speed));
            }
        }
        if self.queue.is_empty() {
            return None;
        }
        let pending = self.queue.remove(0);
        self.time = self.time.max(pending.at);
        self.current = Some(pending.item);
        Some(pending.item)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.repeat.clear();
        self.current = None;
    }

    pub fn contains(&self, item: T) -> bool {
        self.repeat.iter().any(|(entry, _)| *entry == item)
            || self.queue.iter().any(|pending| pending.item == item)
    }

    pub fn len(&self) -> usize {
        self.repeat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repeat.is_empty() && self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faster_items_act_proportionally_more() {
        let mut scheduler = SpeedScheduler::new();
        scheduler.add('s', 1000, true);
        scheduler.add('f', 2000, true);
        let mut slow = 0;
        let mut fast = 0;
        for _ in 0..300 {
            match scheduler.next() {
                Some('s') => slow += 1,
                Some('f') => fast += 1,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!((fast as i32 - 2 * slow as i32).abs() <= 2, "{fast} vs {slow}");
    }

    #[test]
    fn equal_speeds_take_turns_in_insertion_order() {
        let mut scheduler = SpeedScheduler::new();
        scheduler.add(1, 1000, true);
        scheduler.add(2, 1000, true);
        scheduler.add(3, 1000, true);
        let order: Vec<i32> = (0..6).filter_map(|_| scheduler.next()).collect();
        assert_eq!(order, vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn removed_item_gets_no_further_turns() {
        let mut scheduler = SpeedScheduler::new();
        scheduler.add(1, 1000, true);
        scheduler.add(2, 1000, true);
        assert_eq!(scheduler.next(), Some(1));
        assert!(scheduler.remove(1));
        let order: Vec<i32> = (0..4).filter_map(|_| scheduler.next()).collect();
        assert_eq!(order, vec![2, 2, 2, 2]);
        assert!(!scheduler.contains(1));
    }

    #[test]
    fn one_shot_items_are_not_requeued() {
        let mut scheduler = SpeedScheduler::new();
        scheduler.add(7, 1000, false);
        assert_eq!(scheduler.next(), Some(7));
        assert_eq!(scheduler.next(), None);
    }
}
