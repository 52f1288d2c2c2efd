pub mod mediashelf_env;
