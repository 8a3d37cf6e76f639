//! Printed output for values
//!
//! Arrays print row-major, rows separated by newlines and higher axes
//! by blank lines; negatives use the high minus.

use crate::{num::Tower, value::Value};

/// Runtime-owned format settings
#[derive(Debug, Clone)]
pub struct Format {
    /// `⎕PP`: significant digits, 0 for shortest
    pub pp: usize,
}

impl Default for Format {
    fn default() -> Self {
        Format { pp: 0 }
    }
}

pub fn format_value(v: &Value, f: &Format) -> String {
    match v {
        Value::Num(n) => Tower::default().format(n, f.pp),
        Value::Str(s) => s.to_string(),
        Value::Ident(name) => name.to_string(),
        Value::Func(fun) => fun.to_string(),
        Value::Empty => String::new(),
        Value::Pkg(p) => {
            let mut out = String::new();
            if let Some(keys) = p.keys() {
                for key in keys {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(&key);
                    out.push_str(": ");
                    match p.at(&key) {
                        Some(v) => out.push_str(&format_value(&v, f)),
                        None => out.push('?'),
                    }
                }
                out
            } else {
                p.name().to_string()
            }
        }
        _ => {
            if v.size() == 0 {
                return String::new();
            }
            let cells: Vec<String> = (0..v.size())
                .map(|i| format_value(&v.at(i), f))
                .collect();
            let shape = v.shape();
            format_block(&shape, &cells)
        }
    }
}

fn format_block(dims: &[usize], cells: &[String]) -> String {
    if dims.len() <= 1 {
        return cells.join(" ");
    }
    let blocks = dims[0];
    let sub_len = cells.len() / blocks.max(1);
    let sep = "\n".repeat(dims.len() - 1);
    (0..blocks)
        .map(|i| format_block(&dims[1..], &cells[i * sub_len..(i + 1) * sub_len]))
        .collect::<Vec<String>>()
        .join(&sep)
}
