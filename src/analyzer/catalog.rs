//! Static data used by the analyzer.

use crate::core::{ExternalLibrary, PlatformPackage};

/// Headers shipped with every C/C++ toolchain the analyzer targets.
pub const STANDARD_HEADERS: &[&str] = &[
    // C
    "assert.h",
    "complex.h",
    "ctype.h",
    "errno.h",
    "fenv.h",
    "float.h",
    "inttypes.h",
    "iso646.h",
    "limits.h",
    "locale.h",
    "math.h",
    "setjmp.h",
    "signal.h",
    "stdalign.h",
    "stdarg.h",
    "stdatomic.h",
    "stdbool.h",
    "stddef.h",
    "stdint.h",
    "stdio.h",
    "stdlib.h",
    "stdnoreturn.h",
    "string.h",
    "tgmath.h",
    "threads.h",
    "time.h",
    "uchar.h",
    "wchar.h",
    "wctype.h",
    // POSIX
    "arpa/inet.h",
    "dirent.h",
    "dlfcn.h",
    "fcntl.h",
    "netdb.h",
    "netinet/in.h",
    "poll.h",
    "pthread.h",
    "strings.h",
    "sys/socket.h",
    "sys/stat.h",
    "sys/time.h",
    "sys/types.h",
    "sys/wait.h",
    "termios.h",
    "unistd.h",
    // C++
    "algorithm",
    "array",
    "atomic",
    "cassert",
    "chrono",
    "cmath",
    "condition_variable",
    "cstdint",
    "cstdio",
    "cstdlib",
    "cstring",
    "deque",
    "exception",
    "filesystem",
    "fstream",
    "functional",
    "future",
    "iomanip",
    "iostream",
    "iterator",
    "list",
    "map",
    "memory",
    "mutex",
    "numeric",
    "optional",
    "queue",
    "random",
    "set",
    "sstream",
    "stack",
    "stdexcept",
    "string",
    "string_view",
    "thread",
    "tuple",
    "type_traits",
    "unordered_map",
    "unordered_set",
    "utility",
    "variant",
    "vector",
];

/// Whether `include` (as written between the brackets) is a standard header.
pub fn is_standard_header(include: &str) -> bool {
    STANDARD_HEADERS.contains(&include)
}

/// Directories that conventionally hold third-party code.
pub const VENDOR_DIRS: &[&str] = &["vendor", "third_party", "lib", "libs", "deps"];

/// Directory names that suggest a bundled copy of a well-known library.
pub const LIBRARY_DIR_PATTERNS: &[&str] =
    &["json", "xml", "yaml", "http", "crypto", "ssl", "sqlite", "curl"];

macro_rules! platform {
    ($os:literal => $pkg:literal) => {
        PlatformPackage {
            os: $os,
            package: $pkg,
            include_path: None,
            lib_path: None,
        }
    };
    ($os:literal => $pkg:literal, $inc:literal, $lib:literal) => {
        PlatformPackage {
            os: $os,
            package: $pkg,
            include_path: Some($inc),
            lib_path: Some($lib),
        }
    };
}

/// Libraries the analyzer recognizes by header, in reporting order.
pub const KNOWN_LIBRARIES: &[ExternalLibrary] = &[
    ExternalLibrary {
        name: "libmicrohttpd",
        header: "microhttpd.h",
        linker_flag: "-lmicrohttpd",
        pkg_config: Some("libmicrohttpd"),
        platforms: &[
            platform!("darwin" => "libmicrohttpd",
                "/opt/homebrew/opt/libmicrohttpd/include", "/opt/homebrew/opt/libmicrohttpd/lib"),
            platform!("linux" => "libmicrohttpd-dev", "/usr/include", "/usr/lib"),
            platform!("windows" => "libmicrohttpd"),
        ],
    },
    ExternalLibrary {
        name: "libcurl",
        header: "curl/curl.h",
        linker_flag: "-lcurl",
        pkg_config: Some("libcurl"),
        platforms: &[
            platform!("darwin" => "curl",
                "/opt/homebrew/opt/curl/include", "/opt/homebrew/opt/curl/lib"),
            platform!("linux" => "libcurl4-openssl-dev", "/usr/include", "/usr/lib"),
            platform!("windows" => "curl"),
        ],
    },
    ExternalLibrary {
        name: "sqlite3",
        header: "sqlite3.h",
        linker_flag: "-lsqlite3",
        pkg_config: Some("sqlite3"),
        platforms: &[
            platform!("darwin" => "sqlite",
                "/opt/homebrew/opt/sqlite/include", "/opt/homebrew/opt/sqlite/lib"),
            platform!("linux" => "libsqlite3-dev", "/usr/include", "/usr/lib"),
            platform!("windows" => "sqlite"),
        ],
    },
    ExternalLibrary {
        name: "openssl",
        header: "openssl/ssl.h",
        linker_flag: "-lssl -lcrypto",
        pkg_config: Some("openssl"),
        platforms: &[
            platform!("darwin" => "openssl@3",
                "/opt/homebrew/opt/openssl@3/include", "/opt/homebrew/opt/openssl@3/lib"),
            platform!("linux" => "libssl-dev", "/usr/include", "/usr/lib"),
            platform!("windows" => "openssl"),
        ],
    },
    ExternalLibrary {
        name: "zlib",
        header: "zlib.h",
        linker_flag: "-lz",
        pkg_config: Some("zlib"),
        platforms: &[
            platform!("darwin" => "zlib"),
            platform!("linux" => "zlib1g-dev"),
            platform!("windows" => "zlib"),
        ],
    },
    ExternalLibrary {
        name: "pcre",
        header: "pcre.h",
        linker_flag: "-lpcre",
        pkg_config: Some("libpcre"),
        platforms: &[
            platform!("darwin" => "pcre"),
            platform!("linux" => "libpcre3-dev"),
            platform!("windows" => "pcre"),
        ],
    },
    ExternalLibrary {
        name: "pthread",
        header: "pthread.h",
        linker_flag: "-pthread",
        pkg_config: None,
        platforms: &[
            platform!("darwin" => ""),
            platform!("linux" => ""),
            platform!("windows" => "pthreads-win32"),
        ],
    },
    ExternalLibrary {
        name: "libxml2",
        header: "libxml/parser.h",
        linker_flag: "-lxml2",
        pkg_config: Some("libxml-2.0"),
        platforms: &[
            platform!("darwin" => "libxml2"),
            platform!("linux" => "libxml2-dev"),
            platform!("windows" => "libxml2"),
        ],
    },
    ExternalLibrary {
        name: "libuv",
        header: "uv.h",
        linker_flag: "-luv",
        pkg_config: Some("libuv"),
        platforms: &[
            platform!("darwin" => "libuv"),
            platform!("linux" => "libuv1-dev"),
            platform!("windows" => "libuv"),
        ],
    },
    ExternalLibrary {
        name: "libpng",
        header: "png.h",
        linker_flag: "-lpng",
        pkg_config: Some("libpng"),
        platforms: &[
            platform!("darwin" => "libpng"),
            platform!("linux" => "libpng-dev"),
            platform!("windows" => "libpng"),
        ],
    },
    ExternalLibrary {
        name: "SDL2",
        header: "SDL2/SDL.h",
        linker_flag: "-lSDL2",
        pkg_config: Some("sdl2"),
        platforms: &[
            platform!("darwin" => "sdl2"),
            platform!("linux" => "libsdl2-dev"),
            platform!("windows" => "sdl2"),
        ],
    },
];

/// The catalog entry an include refers to, if any.
pub fn find_library(include: &str) -> Option<&'static ExternalLibrary> {
    KNOWN_LIBRARIES.iter().find(|lib| lib.matches_include(include))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Os;

    #[test]
    fn test_standard_headers() {
        assert!(is_standard_header("stdio.h"));
        assert!(is_standard_header("sys/types.h"));
        assert!(is_standard_header("iostream"));
        assert!(is_standard_header("string"));
        assert!(!is_standard_header("curl/curl.h"));
        assert!(!is_standard_header("myutils.h"));
    }

    #[test]
    fn test_find_library() {
        assert_eq!(find_library("curl/curl.h").map(|l| l.name), Some("libcurl"));
        assert_eq!(find_library("SDL2/SDL.h").map(|l| l.name), Some("SDL2"));
        assert!(find_library("jansson.h").is_none());
    }

    #[test]
    fn test_platform_packages() {
        let curl = find_library("curl/curl.h").unwrap();
        assert_eq!(curl.package_for(&Os::Linux), Some("libcurl4-openssl-dev"));
        assert_eq!(curl.package_for(&Os::Darwin), Some("curl"));

        let openssl = find_library("openssl/ssl.h").unwrap();
        assert_eq!(openssl.package_for(&Os::Darwin), Some("openssl@3"));

        let pthread = find_library("pthread.h").unwrap();
        assert_eq!(pthread.package_for(&Os::Linux), Some(""));
        assert_eq!(pthread.package_for(&Os::Windows), Some("pthreads-win32"));
    }

    #[test]
    fn test_every_library_covers_three_platforms() {
        for lib in KNOWN_LIBRARIES {
            for os in ["linux", "darwin", "windows"] {
                assert!(lib.platforms.iter().any(|p| p.os == os), "{} {}", lib.name, os);
            }
        }
    }
}
