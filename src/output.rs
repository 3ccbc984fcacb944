// src/output.rs
use crate::events::Event;
use crate::solution::Solution;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// One row per sample: `t, y_0..y_{N-1}` and, when present, `w_0..w_{N-1}`
pub fn write_solution_csv(filename: &str, solution: &Solution) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    write_solution(&mut file, solution)?;
    file.flush()
}

pub fn write_events_csv(filename: &str, events: &[Event]) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    write_events(&mut file, events)?;
    file.flush()
}

fn write_solution<W: Write>(out: &mut W, solution: &Solution) -> io::Result<()> {
    let n = solution.dim();
    let mut header = vec!["t".to_string()];
    header.extend((0..n).map(|k| format!("y_{}", k)));
    if solution.w.is_some() {
        header.extend((0..n).map(|k| format!("w_{}", k)));
    }
    writeln!(out, "{}", header.join(","))?;

    for (i, t) in solution.t.iter().enumerate() {
        let mut fields = vec![t.to_string()];
        fields.extend(solution.y.row(i).iter().map(|v| v.to_string()));
        if let Some(w) = &solution.w {
            fields.extend(w.row(i).iter().map(|v| v.to_string()));
        }
        writeln!(out, "{}", fields.join(","))?;
    }
    Ok(())
}

fn write_events<W: Write>(out: &mut W, events: &[Event]) -> io::Result<()> {
    writeln!(out, "step,index,time,state")?;
    for e in events {
        let state = e
            .state
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(";");
        writeln!(out, "{},{},{},{}", e.step, e.index, e.time, state)?;
    }
    Ok(())
}
