use std::fmt;

const BYTES_PER_LINE: usize = 16;

/// Classic hex dump: offset, sixteen hex bytes split in two groups, ASCII column.
#[derive(Clone, Copy, Debug)]
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (line, chunk) in self.0.chunks(BYTES_PER_LINE).enumerate() {
            write!(f, "{:08x}  ", line * BYTES_PER_LINE)?;
            for i in 0..BYTES_PER_LINE {
                match chunk.get(i) {
                    Some(byte) => write!(f, "{byte:02x} ")?,
                    None => f.write_str("   ")?,
                }
                if i == 7 {
                    f.write_str(" ")?;
                }
            }
            f.write_str(" |")?;
            for &b in chunk {
                let shown = if (0x20..=0x7e).contains(&b) { b as char } else { '.' };
                write!(f, "{shown}")?;
            }
            f.write_str("|\n")?;
        }
        Ok(())
    }
}

pub fn hex_dump(bytes: &[u8]) -> String {
    HexDump(bytes).to_string()
}
