use crate::{gfa, utils};
use crate::{GFAGraph, GFAParams};

use rand::Rng;

//-----------------------------------------------------------------------------

const BASES: &[u8] = b"ACGT";

pub(crate) fn random_sequence<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    (0..len).map(|_| BASES[rng.gen_range(0..BASES.len())]).collect()
}

pub(crate) fn chunked_params(max_node_length: usize) -> GFAParams {
    GFAParams { max_node_length, ..GFAParams::default() }
}

pub(crate) fn load_gfa(filename: &'static str, params: &GFAParams) -> GFAGraph {
    let gfa_file = utils::get_test_data(filename);
    let graph = gfa::load_gfa(&gfa_file, params);
    if let Err(err) = graph {
        panic!("Failed to load GFA from {}: {}", gfa_file.display(), err);
    }
    graph.unwrap()
}

//-----------------------------------------------------------------------------
