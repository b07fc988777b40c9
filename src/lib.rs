pub mod analysis;
pub mod codec;
pub mod core;
pub mod index;
pub mod mmap;
pub mod pool;
pub mod search;
pub mod server;
pub mod walk;

/*
┌──────────────────────────────────────────────────────────────────────┐
│                         SKALD ARCHITECTURE                           │
└──────────────────────────────────────────────────────────────────────┘

  skald-index (batch)
    walk      discover files breadth-first, sorted per directory
    analysis  split content into words, heuristics + stop words
    index     in-memory word map, spill to partial files, k-way merge
    codec     BCD varints + four-segment index file (writer side)

  skald-searchd (daemon)
    mmap      map the finished index read-only
    codec     header-table random access, lazy entry decode (reader side)
    search    additive rank scoring over the mapped segments
    pool      min/max worker threads, idle shrink-back
    server    TCP + unix listeners, request line protocol, reset on error

  core holds the shared config, error, and record types.
*/
