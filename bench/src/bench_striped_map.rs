use std::hash::Hash;

use dashmap::DashMap;
use rand::{distributions::Alphanumeric, Rng};
use rowmap::{Builder, CoarseMap, Map, StripedHashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::Barrier;
use std::thread;
use std::time::Instant;

const NUM_ROWS: usize = 100;
const MAX_AVG_ROW_LEN: usize = 8;

macro_rules! bench {
    ($name: expr, $body: expr) => {
        let now = Instant::now();
        $body;
        let elapsed = now.elapsed();
        println!("{} elapsed: {:.2?}", $name, elapsed);
    };
}

fn make_random_string() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect()
}

fn make_random_string_pairs(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|_| (make_random_string(), make_random_string()))
        .collect()
}

fn partition_data<T>(data: Vec<T>, num_partitions: usize) -> Vec<Vec<T>> {
    match num_partitions {
        0 => unimplemented!(),
        1 => vec![data],
        n => {
            let partition_sz = data.len() / n;
            let mut out = Vec::new();
            let mut c = 0;
            let mut buf = Vec::new();
            for item in data {
                buf.push(item);
                c += 1;
                if c == partition_sz {
                    c = 0;
                    out.push(buf);
                    buf = Vec::new();
                }
            }
            if !buf.is_empty() {
                out.push(buf);
            }
            out
        }
    }
}

/// Adapts `DashMap` to the `Map` trait so every map runs the same bench.
struct Dash<K, V>(DashMap<K, V>);

impl<K: Hash + Eq, V: Clone> Map for Dash<K, V> {
    type Key = K;
    type Val = V;

    fn get(&self, key: &K) -> Option<V> {
        self.0.get(key).map(|v| v.value().clone())
    }

    fn contains(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    fn put(&self, key: K, value: V) {
        self.0.insert(key, value);
    }

    fn remove(&self, key: &K) -> bool {
        self.0.remove(key).is_some()
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn clear(&self) {
        self.0.clear();
    }
}

fn bench_single_threaded<M: Map>(name: &str, map: M, src: &[(M::Key, M::Val)])
where
    M::Key: Clone,
    M::Val: Clone,
{
    let map_data = src.to_vec();
    bench!(name, {
        for (key, val) in map_data {
            map.put(key, val);
        }
    });
    assert_eq!(map.len(), distinct(src));
}

fn bench_multi_threaded<M>(name: &str, map: M, num_threads: usize, src: &[(M::Key, M::Val)])
where
    M: Map + Send + Sync + 'static,
    M::Key: Clone + Send + 'static,
    M::Val: Clone + Send + 'static,
{
    let thread_data = partition_data(src.to_vec(), num_threads);
    let map = Arc::new(map);
    let start_barr = Arc::new(Barrier::new(thread_data.len() + 1));
    let end_barr = Arc::new(Barrier::new(thread_data.len() + 1));

    let mut handles = Vec::new();
    for data in thread_data {
        let tmap = map.clone();
        let t_start_barr = start_barr.clone();
        let t_end_barr = end_barr.clone();
        handles.push(thread::spawn(move || {
            t_start_barr.wait();
            for (key, val) in data {
                tmap.put(key, val);
            }
            t_end_barr.wait();
        }));
    }

    start_barr.wait();
    let now = Instant::now();
    end_barr.wait();
    let elapsed = now.elapsed();
    println!("{} multithreaded elapsed: {:.2?}", name, elapsed);

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(map.len(), distinct(src));
}

/// Inserts from `num_threads` writers while another thread keeps resizing.
fn bench_resize_under_load(num_threads: usize, src: &[(String, String)]) {
    let thread_data = partition_data(src.to_vec(), num_threads);
    let map = Arc::new(striped());
    let done = Arc::new(AtomicBool::new(false));

    let resizer = {
        let map = map.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut resizes = 0;
            let mut rows = 1 << 14;
            while !done.load(Ordering::Relaxed) {
                rows = if rows >= 1 << 19 { 1 << 14 } else { rows * 2 };
                map.resize(rows).unwrap();
                resizes += 1;
            }
            resizes
        })
    };

    bench!("StripedHashMap with concurrent resize", {
        let handles: Vec<_> = thread_data
            .into_iter()
            .map(|data| {
                let tmap = map.clone();
                thread::spawn(move || {
                    for (key, val) in data {
                        tmap.put(key, val);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    });

    done.store(true, Ordering::Relaxed);
    let resizes = resizer.join().unwrap();
    println!("resizes during run: {}", resizes);
    assert_eq!(map.len(), distinct(src));
}

fn striped() -> StripedHashMap<String, String> {
    Builder::new()
        .num_rows(NUM_ROWS)
        .max_avg_row_len(MAX_AVG_ROW_LEN)
        .build()
        .unwrap()
}

fn distinct<K: Hash + Eq, V>(src: &[(K, V)]) -> usize {
    src.iter()
        .map(|(k, _)| k)
        .collect::<std::collections::HashSet<_>>()
        .len()
}

fn main() {
    let input = make_random_string_pairs(1_000_000);

    println!("bench single threaded");
    bench_single_threaded("StripedHashMap", striped(), &input);
    bench_single_threaded("CoarseMap", CoarseMap::new(), &input);
    bench_single_threaded("DashMap", Dash(DashMap::new()), &input);

    println!("bench multi threaded");
    bench_multi_threaded("StripedHashMap", striped(), 10, &input);
    bench_multi_threaded("CoarseMap", CoarseMap::new(), 10, &input);
    bench_multi_threaded("DashMap", Dash(DashMap::new()), 10, &input);

    println!("bench resize under load");
    bench_resize_under_load(10, &input);
}
