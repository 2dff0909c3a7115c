//! Rank table generator.
//!
//! Enumerates all 7462 distinct 5-card hand classes in strict best-to-worst
//! order and builds the three lookup tables the evaluator reads from:
//! `flush_table`, `unique5_table`, and a sorted `product_table`. The
//! generation order below is taken as ground truth from a reference
//! generator and must be reproduced exactly — any reordering changes which
//! integer a hand class maps to.

use crate::card::RANK_PRIMES;
use crate::error::SolverError;
use std::io::{Read, Write};
use std::path::Path;

const BITMASK_SIZE: usize = 8192;
const HEADER_MAGIC: u32 = 0x4852_4E4B;
const HEADER_VERSION: i32 = 3;

struct HandClass {
    product: u64,
    bits: u16,
    is_flush: bool,
}

fn is_straight(bits: u16) -> bool {
    for high in (4..=12).rev() {
        let mask: u16 = 0x1F << (high - 4);
        if bits & mask == mask {
            return true;
        }
    }
    bits & 0x100F == 0x100F
}

fn prime_product(ranks: &[u8]) -> u64 {
    ranks
        .iter()
        .map(|&r| RANK_PRIMES[r as usize] as u64)
        .product()
}

fn generate_all_hands() -> Vec<HandClass> {
    let mut hands = Vec::with_capacity(7462);

    // Straight flushes: A-high (royal) down to 6-high, then the wheel.
    for high in (4..=12).rev() {
        let bits: u16 = 0x1F << (high - 4);
        let ranks: Vec<u8> = (0..13).filter(|&r| bits & (1 << r) != 0).collect();
        hands.push(HandClass {
            product: prime_product(&ranks),
            bits,
            is_flush: true,
        });
    }
    {
        let bits: u16 = (1 << 12) | 0xF;
        hands.push(HandClass {
            product: prime_product(&[12, 3, 2, 1, 0]),
            bits,
            is_flush: true,
        });
    }

    // Four of a kind: quad rank desc x kicker desc.
    for q in (0..13u8).rev() {
        for k in (0..13u8).rev() {
            if k == q {
                continue;
            }
            let product = RANK_PRIMES[q as usize] as u64 * RANK_PRIMES[q as usize] as u64
                * RANK_PRIMES[q as usize] as u64
                * RANK_PRIMES[q as usize] as u64
                * RANK_PRIMES[k as usize] as u64;
            hands.push(HandClass {
                product,
                bits: (1 << q) | (1 << k),
                is_flush: false,
            });
        }
    }

    // Full house: trips desc x pair desc.
    for t in (0..13u8).rev() {
        for p in (0..13u8).rev() {
            if p == t {
                continue;
            }
            let product = RANK_PRIMES[t as usize] as u64 * RANK_PRIMES[t as usize] as u64
                * RANK_PRIMES[t as usize] as u64
                * RANK_PRIMES[p as usize] as u64
                * RANK_PRIMES[p as usize] as u64;
            hands.push(HandClass {
                product,
                bits: (1 << t) | (1 << p),
                is_flush: false,
            });
        }
    }

    // Flush: every non-straight 5-rank combination, descending lexicographically.
    for r0 in (4..=12u8).rev() {
        for r1 in (3..r0).rev() {
            for r2 in (2..r1).rev() {
                for r3 in (1..r2).rev() {
                    for r4 in (0..r3).rev() {
                        let bits: u16 = (1 << r0) | (1 << r1) | (1 << r2) | (1 << r3) | (1 << r4);
                        if is_straight(bits) {
                            continue;
                        }
                        hands.push(HandClass {
                            product: prime_product(&[r0, r1, r2, r3, r4]),
                            bits,
                            is_flush: true,
                        });
                    }
                }
            }
        }
    }

    // Straight: A-high down to wheel.
    for high in (4..=12).rev() {
        let bits: u16 = 0x1F << (high - 4);
        let ranks: Vec<u8> = (0..13).filter(|&r| bits & (1 << r) != 0).collect();
        hands.push(HandClass {
            product: prime_product(&ranks),
            bits,
            is_flush: false,
        });
    }
    {
        let bits: u16 = (1 << 12) | 0xF;
        hands.push(HandClass {
            product: prime_product(&[12, 3, 2, 1, 0]),
            bits,
            is_flush: false,
        });
    }

    // Three of a kind: trips desc x two kickers desc.
    for t in (0..13u8).rev() {
        for k1 in (0..13u8).rev() {
            if k1 == t {
                continue;
            }
            for k2 in (0..k1).rev() {
                if k2 == t {
                    continue;
                }
                let product = RANK_PRIMES[t as usize] as u64 * RANK_PRIMES[t as usize] as u64
                    * RANK_PRIMES[t as usize] as u64
                    * RANK_PRIMES[k1 as usize] as u64
                    * RANK_PRIMES[k2 as usize] as u64;
                hands.push(HandClass {
                    product,
                    bits: (1 << t) | (1 << k1) | (1 << k2),
                    is_flush: false,
                });
            }
        }
    }

    // Two pair: high pair desc x low pair desc x kicker desc.
    for p1 in (1..13u8).rev() {
        for p2 in (0..p1).rev() {
            for k in (0..13u8).rev() {
                if k == p1 || k == p2 {
                    continue;
                }
                let product = RANK_PRIMES[p1 as usize] as u64 * RANK_PRIMES[p1 as usize] as u64
                    * RANK_PRIMES[p2 as usize] as u64
                    * RANK_PRIMES[p2 as usize] as u64
                    * RANK_PRIMES[k as usize] as u64;
                hands.push(HandClass {
                    product,
                    bits: (1 << p1) | (1 << p2) | (1 << k),
                    is_flush: false,
                });
            }
        }
    }

    // One pair: pair rank desc x three kickers desc.
    for p in (0..13u8).rev() {
        for k1 in (0..13u8).rev() {
            if k1 == p {
                continue;
            }
            for k2 in (0..k1).rev() {
                if k2 == p {
                    continue;
                }
                for k3 in (0..k2).rev() {
                    if k3 == p {
                        continue;
                    }
                    let product = RANK_PRIMES[p as usize] as u64 * RANK_PRIMES[p as usize] as u64
                        * RANK_PRIMES[k1 as usize] as u64
                        * RANK_PRIMES[k2 as usize] as u64
                        * RANK_PRIMES[k3 as usize] as u64;
                    hands.push(HandClass {
                        product,
                        bits: (1 << p) | (1 << k1) | (1 << k2) | (1 << k3),
                        is_flush: false,
                    });
                }
            }
        }
    }

    // High card: same combinations as the flush loop, marked non-flush.
    for r0 in (4..=12u8).rev() {
        for r1 in (3..r0).rev() {
            for r2 in (2..r1).rev() {
                for r3 in (1..r2).rev() {
                    for r4 in (0..r3).rev() {
                        let bits: u16 = (1 << r0) | (1 << r1) | (1 << r2) | (1 << r3) | (1 << r4);
                        if is_straight(bits) {
                            continue;
                        }
                        hands.push(HandClass {
                            product: prime_product(&[r0, r1, r2, r3, r4]),
                            bits,
                            is_flush: false,
                        });
                    }
                }
            }
        }
    }

    hands
}

/// The three lookup tables [`crate::evaluator`] reads from.
///
/// Immutable after construction and safe to share across threads; the
/// driver loads or generates one instance and wraps it in an `Arc` for every
/// parallel solver instance to borrow (§5 of the specification this crate
/// implements treats the tables as process-global, read-only memory).
#[derive(Debug, Clone)]
pub struct RankTables {
    flush_table: Vec<i16>,
    unique5_table: Vec<i16>,
    product_table: Vec<(u32, i16)>,
}

impl RankTables {
    /// Run the full generation pipeline: enumerate all hand classes,
    /// bucket them into the three tables, and self-verify a handful of
    /// known fixed points before returning.
    pub fn generate() -> Result<Self, SolverError> {
        let hands = generate_all_hands();

        let mut flush_table = vec![0i16; BITMASK_SIZE];
        let mut unique5_table = vec![0i16; BITMASK_SIZE];
        let mut product_table = Vec::new();

        for (i, hand) in hands.iter().enumerate() {
            let rank = (i + 1) as i16;
            let pop = hand.bits.count_ones();
            if hand.is_flush {
                flush_table[hand.bits as usize] = rank;
            } else if pop == 5 {
                unique5_table[hand.bits as usize] = rank;
            } else {
                product_table.push((hand.product as u32, rank));
            }
        }
        product_table.sort_unstable_by_key(|&(product, _)| product);

        let tables = RankTables {
            flush_table,
            unique5_table,
            product_table,
        };
        tables.verify()?;
        Ok(tables)
    }

    fn find_product_rank(&self, product: u32) -> Option<i16> {
        self.product_table
            .binary_search_by_key(&product, |&(p, _)| p)
            .ok()
            .map(|i| self.product_table[i].1)
    }

    fn verify(&self) -> Result<(), SolverError> {
        let royal_bits: u16 = (1 << 12) | (1 << 11) | (1 << 10) | (1 << 9) | (1 << 8);
        let wheel_bits: u16 = (1 << 12) | (1 << 3) | (1 << 2) | (1 << 1) | 1;
        let worst_bits: u16 = (1 << 5) | (1 << 3) | (1 << 2) | (1 << 1) | 1;

        let checks: [(&str, i16, i16); 8] = [
            ("royal flush", self.flush_table[royal_bits as usize], 1),
            ("steel wheel", self.flush_table[wheel_bits as usize], 10),
            (
                "quad aces + king",
                self.find_product_rank(41 * 41 * 41 * 41 * 37).unwrap_or(-1),
                11,
            ),
            (
                "quad aces + queen",
                self.find_product_rank(41 * 41 * 41 * 41 * 31).unwrap_or(-1),
                12,
            ),
            ("broadway straight", self.unique5_table[royal_bits as usize], 1600),
            ("wheel straight", self.unique5_table[wheel_bits as usize], 1609),
            ("worst high card", self.unique5_table[worst_bits as usize], 7462),
            (
                "best full house",
                self.find_product_rank(41 * 41 * 41 * 37 * 37).unwrap_or(-1),
                167,
            ),
        ];

        for (name, found, expected) in checks {
            if found != expected {
                return Err(SolverError::TableVerification(format!(
                    "{name}: got rank {found}, expected {expected}"
                )));
            }
        }
        let aakqj = self.find_product_rank(41 * 41 * 37 * 31 * 29).unwrap_or(-1);
        if aakqj != 3326 {
            return Err(SolverError::TableVerification(format!(
                "best one pair: got rank {aakqj}, expected 3326"
            )));
        }
        Ok(())
    }

    /// Index by a 13-bit flushing-suit rank mask; valid for flushes and
    /// straight flushes.
    pub fn flush_rank(&self, mask: u16) -> i16 {
        self.flush_table[mask as usize]
    }

    /// Index by a 13-bit rank-presence mask when exactly five distinct
    /// ranks are present and no suit flushes; covers straights and
    /// high-card hands.
    pub fn unique5_rank(&self, mask: u16) -> i16 {
        self.unique5_table[mask as usize]
    }

    /// Binary-search the sorted prime-product table; covers every hand
    /// class containing at least one pair.
    pub fn product_rank(&self, product: u32) -> i16 {
        self.find_product_rank(product).unwrap_or(0)
    }

    /// Serialize to the little-endian binary layout: a 16-byte header
    /// (magic, version, bitmask size, product count) followed by the two
    /// fixed-size tables and the variable-length product table.
    pub fn write_to(&self, mut out: impl Write) -> Result<(), SolverError> {
        let io_err = |source: std::io::Error| SolverError::TableLoadIo {
            path: "<writer>".to_string(),
            source,
        };

        out.write_all(&HEADER_MAGIC.to_le_bytes()).map_err(io_err)?;
        out.write_all(&HEADER_VERSION.to_le_bytes()).map_err(io_err)?;
        out.write_all(&(BITMASK_SIZE as i32).to_le_bytes())
            .map_err(io_err)?;
        out.write_all(&(self.product_table.len() as i32).to_le_bytes())
            .map_err(io_err)?;
        for &v in &self.flush_table {
            out.write_all(&v.to_le_bytes()).map_err(io_err)?;
        }
        for &v in &self.unique5_table {
            out.write_all(&v.to_le_bytes()).map_err(io_err)?;
        }
        for &(product, rank) in &self.product_table {
            out.write_all(&product.to_le_bytes()).map_err(io_err)?;
            out.write_all(&rank.to_le_bytes()).map_err(io_err)?;
        }
        Ok(())
    }

    /// Write the generated tables to a file at `path`.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SolverError> {
        let path_str = path.as_ref().display().to_string();
        let file = std::fs::File::create(path.as_ref()).map_err(|source| SolverError::TableLoadIo {
            path: path_str.clone(),
            source,
        })?;
        self.write_to(std::io::BufWriter::new(file))
    }

    /// Load tables previously written by [`RankTables::write_to_file`].
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SolverError> {
        let path_str = path.as_ref().display().to_string();
        let mut file = std::fs::File::open(path.as_ref()).map_err(|source| SolverError::TableLoadIo {
            path: path_str.clone(),
            source,
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|source| SolverError::TableLoadIo {
                path: path_str.clone(),
                source,
            })?;
        Self::load_from_bytes(&bytes, &path_str)
    }

    fn load_from_bytes(bytes: &[u8], path: &str) -> Result<Self, SolverError> {
        if bytes.len() < 16 {
            return Err(SolverError::TableLoadTruncated {
                path: path.to_string(),
                expected: 16,
                found: bytes.len(),
            });
        }
        let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        if magic != HEADER_MAGIC {
            return Err(SolverError::TableLoadMagic {
                path: path.to_string(),
                found: magic,
                expected: HEADER_MAGIC,
            });
        }
        let version = i32::from_le_bytes(bytes[4..8].try_into().unwrap());
        if version != HEADER_VERSION {
            return Err(SolverError::TableLoadVersion {
                path: path.to_string(),
                found: version,
                expected: HEADER_VERSION,
            });
        }
        let bitmask_size = i32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
        let product_count = i32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;

        let expected_len =
            16 + bitmask_size * 2 * std::mem::size_of::<i16>() + product_count * 6;
        if bytes.len() < expected_len {
            return Err(SolverError::TableLoadTruncated {
                path: path.to_string(),
                expected: expected_len,
                found: bytes.len(),
            });
        }

        let mut offset = 16;
        let mut flush_table = Vec::with_capacity(bitmask_size);
        for _ in 0..bitmask_size {
            flush_table.push(i16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap()));
            offset += 2;
        }
        let mut unique5_table = Vec::with_capacity(bitmask_size);
        for _ in 0..bitmask_size {
            unique5_table.push(i16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap()));
            offset += 2;
        }
        let mut product_table = Vec::with_capacity(product_count);
        for _ in 0..product_count {
            let product = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
            offset += 4;
            let rank = i16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap());
            offset += 2;
            product_table.push((product, rank));
        }

        Ok(RankTables {
            flush_table,
            unique5_table,
            product_table,
        })
    }
}
