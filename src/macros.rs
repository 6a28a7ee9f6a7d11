/// Brings an `fs` module into scope for opening local files.
///
/// With the `fs-err` feature this is [`fs_err`](https://docs.rs/fs-err),
/// whose errors name the path that failed to open; otherwise it is [`std::fs`].
/// Callers convert back to [`std::fs::File`] with `into_parts` under the same feature.
macro_rules! use_local_fs_module {
    () => {
        #[cfg(feature = "fs-err")]
        use fs_err as fs;
        #[cfg(not(feature = "fs-err"))]
        use std::fs;
    };
}

pub(crate) use use_local_fs_module;
