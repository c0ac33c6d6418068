//! Sample interpreter sources for generator tests.
//!
//! The texts mirror the shape of the real headers and operation table closely
//! enough for every extraction anchor to match, while staying small enough to
//! reason about in assertions.
//!
//! # Examples
//!
//! ```
//! use templategen_test_helpers::sample::{SampleTree, write_tree};
//!
//! let tree = write_tree(&SampleTree::default()).expect("write sample tree");
//! assert!(tree.path().join("rv32_template.c").exists());
//! ```

use std::io::Write;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};
use tempfile::TempDir;

/// ABI register names, in encoding order.
pub const REGISTER_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// I/O interface header declaring `memory_t`.
pub const IO_HEADER: &str = r"/*
 * rv32emu is freely redistributable under the MIT License. See the file
 * 'LICENSE' for information on usage and redistribution of this file.
 */

#pragma once

#include <stdint.h>

typedef struct {
    uint8_t *mem_base; /* start of guest memory */
    uint64_t mem_size;
} memory_t;

/* create a memory instance of the given size */
memory_t *memory_new(uint32_t size);
void memory_delete(memory_t *m);
";

const RISCV_HEADER_TAIL: &str = r"
enum {
#define _(reg) rv_reg_##reg,
    RV_REGS_LIST
#undef _
    N_RV_REGS
};

typedef struct riscv_internal riscv_t;
typedef void *riscv_user_t;

typedef uint32_t riscv_word_t;
typedef uint16_t riscv_half_t;
typedef uint8_t riscv_byte_t;
typedef uint32_t riscv_exception_t;

/* memory access callbacks */
typedef riscv_word_t (*riscv_mem_ifetch)(riscv_word_t addr);
typedef riscv_word_t (*riscv_mem_read_w)(riscv_word_t addr);
typedef void (*riscv_mem_write_w)(riscv_word_t addr, riscv_word_t data);
typedef void (*riscv_on_ecall)(riscv_t *rv);
typedef void (*riscv_on_ebreak)(riscv_t *rv);

typedef struct {
    /* instruction fetch */
    riscv_mem_ifetch mem_ifetch;
    riscv_mem_read_w mem_read_w;
    riscv_mem_write_w mem_write_w;
    /* system */
    riscv_on_ecall on_ecall;
    riscv_on_ebreak on_ebreak;
    bool allow_misalign;
} riscv_io_t;

typedef struct {
    memory_t *mem;
    riscv_word_t break_addr;
    map_t fd_map; /* file descriptor map: int -> (FILE *) */
} state_t;
";

/// Builds the public emulator header with the first `register_count`
/// register names in `RV_REGS_LIST`.
#[must_use]
pub fn riscv_header(register_count: usize) -> String {
    let mut header = String::from(
        "#pragma once\n\n#include <stdbool.h>\n#include <stdint.h>\n\n\
         /* RISC-V registers, ABI names in encoding order */\n\
         #define RV_REGS_LIST \\\n",
    );
    let names: Vec<&str> = REGISTER_NAMES.iter().copied().take(register_count).collect();
    let last = names.len().saturating_sub(1);
    for (idx, name) in names.iter().enumerate() {
        let continuation = if idx == last { "" } else { " \\" };
        header.push_str(&format!("    _({name}) /* {name} */{continuation}\n"));
    }
    header.push_str(RISCV_HEADER_TAIL);
    header
}

/// Soft-float header holding the exception flag enumeration.
pub const SOFTFLOAT_HEADER: &str = r"#pragma once

/* exception flags */
enum {
    softfloat_flag_inexact = 1,
    softfloat_flag_underflow = 2,
    softfloat_flag_overflow = 4,
    softfloat_flag_infinite = 8,
    softfloat_flag_invalid = 16
};
";

/// Internal header declaring `struct riscv_internal`.
pub const PRIVATE_HEADER: &str = r#"#pragma once

#include <stdbool.h>
#if RV32_HAS(GDBSTUB)
#include "mini-gdbstub/include/gdbstub.h"
#endif
#include "riscv.h"

struct riscv_internal {
    bool halt; /* indicate whether the core is halted */

    /* I/O interface */
    riscv_io_t io;

    /* integer registers */
    riscv_word_t X[N_RV_REGS];
    riscv_word_t PC;

    /* user provided data */
    riscv_user_t userdata;

#if RV32_HAS(EXT_F)
    /* float registers */
    riscv_float_t F[N_RV_REGS];
    uint32_t csr_fcsr;
#endif

    /* csr registers */
    uint64_t csr_cycle;
    uint32_t csr_mstatus;

    bool compressed; /**< current instruction is compressed or not */
#if !RV32_HAS(JIT)
    block_map_t block_map;
#else
    struct cache *block_cache;
#endif

#if RV32_HAS(GDBSTUB)
    gdbstub_t gdbstub;
    bool debug_mode;
#endif
};
"#;

/// Canonical operation table, in source order:
/// `nop lui auipc jal addi add sll sra ebreak lw mul rem caddi cj`.
pub const OPERATION_TABLE: &str = r"/* RV32I Base Instruction Set */

/* Internal */
RVOP(nop, {/* no operation */})

/* LUI is used to build 32-bit constants and uses the U-type format. */
RVOP(lui, { rv->X[ir->rd] = ir->imm; })

/* AUIPC */
RVOP(auipc, { rv->X[ir->rd] = ir->imm + PC; })

/* JAL: Jump and Link */
RVOP(jal, {
    const uint32_t pc = PC;
    PC += ir->imm;
    if (ir->rd)
        rv->X[ir->rd] = pc + ir->insn_len;
    RV_EXC_MISALIGN_HANDLER(pc, insn, false, 0);
    return true;
})

/* ADDI adds the sign-extended 12-bit immediate to register rs1. */
RVOP(addi, { rv->X[ir->rd] = (int32_t) (rv->X[ir->rs1]) + ir->imm; })

/* ADD */
RVOP(add, {
    rv->X[ir->rd] = (int32_t) (rv->X[ir->rs1]) + (int32_t) (rv->X[ir->rs2]);
})

/* SLL: Shift Left Logical */
RVOP(sll, { rv->X[ir->rd] = rv->X[ir->rs1] << (rv->X[ir->rs2] & 0x1f); })

/* SRA: Shift Right Arithmetic */
RVOP(sra, {
    const uint32_t tmp = rv->X[ir->rs2] & 0x1f;
    rv->X[ir->rd] = ((int32_t) rv->X[ir->rs1]) >> tmp;
})

/* EBREAK: return control to the debugger */
RVOP(ebreak, {
    rv->compressed = false;
    rv->io.on_ebreak(rv);
    return true;
})

/* LW: Load Word */
RVOP(lw, {
    const uint32_t addr = rv->X[ir->rs1] + ir->imm;
    RV_EXC_MISALIGN_HANDLER(3, load, false, 1);
    rv->X[ir->rd] = rv->io.mem_read_w(addr);
})

#if RV32_HAS(EXT_M)
/* MUL: Multiply */
RVOP(mul, {
    const int64_t multiplicand = (int32_t) rv->X[ir->rs1];
    const int64_t multiplier = (int32_t) rv->X[ir->rs2];
    rv->X[ir->rd] = ((uint64_t) (multiplicand * multiplier)) & ((1ULL << 32) - 1);
})

/* REM: Remainder Signed */
RVOP(rem, {
    const int32_t dividend = rv->X[ir->rs1];
    const int32_t divisor = rv->X[ir->rs2];
    rv->X[ir->rd] = !divisor ? dividend : dividend % divisor;
})
#endif

#if RV32_HAS(EXT_C)
/* C.ADDI adds the non-zero sign-extended immediate to rd. */
RVOP(caddi, { rv->X[ir->rd] += (int16_t) ir->imm; })

/* C.J */
RVOP(cj, {
    PC += ir->imm;
    return true;
})
#endif
";

/// Builds an operation table holding one `RVOP` block per `(mnemonic, body)`
/// pair, in the given order.
#[must_use]
pub fn operation_table(operations: &[(&str, &str)]) -> String {
    operations
        .iter()
        .map(|(mnemonic, body)| format!("RVOP({mnemonic}, {{\n    {body}\n}})\n\n"))
        .collect()
}

/// File contents of a sample tree. `None` leaves the file out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleTree {
    /// Contents of `io.h`.
    pub io: Option<String>,
    /// Contents of `riscv.h`.
    pub riscv: Option<String>,
    /// Contents of `softfloat.h`.
    pub softfloat: Option<String>,
    /// Contents of `riscv_private.h`.
    pub private: Option<String>,
    /// Contents of `rv32_template.c`.
    pub operations: Option<String>,
}

impl Default for SampleTree {
    fn default() -> Self {
        Self {
            io: Some(IO_HEADER.to_owned()),
            riscv: Some(riscv_header(REGISTER_NAMES.len())),
            softfloat: None,
            private: Some(PRIVATE_HEADER.to_owned()),
            operations: Some(OPERATION_TABLE.to_owned()),
        }
    }
}

impl SampleTree {
    /// The default tree plus `softfloat.h`.
    #[must_use]
    pub fn with_softfloat() -> Self {
        Self {
            softfloat: Some(SOFTFLOAT_HEADER.to_owned()),
            ..Self::default()
        }
    }

    /// Files to write, paired with their default names.
    fn files(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("io.h", self.io.as_deref()),
            ("riscv.h", self.riscv.as_deref()),
            ("softfloat.h", self.softfloat.as_deref()),
            ("riscv_private.h", self.private.as_deref()),
            ("rv32_template.c", self.operations.as_deref()),
        ]
    }
}

/// A sample tree on disk; the directory is removed on drop.
#[derive(Debug)]
pub struct SampleDir {
    _temp: TempDir,
    path: Utf8PathBuf,
}

impl SampleDir {
    /// Root of the sample source directory.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

/// Writes `tree` into a fresh temporary directory.
///
/// # Errors
///
/// Returns an error when the directory or any file cannot be created.
pub fn write_tree(tree: &SampleTree) -> Result<SampleDir> {
    let temp = tempfile::tempdir().context("create temp dir")?;
    let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
        .map_err(|p| anyhow::anyhow!("non-UTF-8 temp path: {}", p.display()))?;
    let dir = Dir::open_ambient_dir(&path, ambient_authority()).context("open temp dir")?;

    for (name, contents) in tree.files() {
        let Some(text) = contents else { continue };
        let mut file = dir
            .open_with(name, OpenOptions::new().write(true).create(true).truncate(true))
            .with_context(|| format!("create {name}"))?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("write {name}"))?;
    }

    Ok(SampleDir { _temp: temp, path })
}
