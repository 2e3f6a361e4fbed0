//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::rc::Rc;

use cxxview_core::host::{TypeRef, ValueRef};
use cxxview_core::layout::{MemoryContext, TypeLayout};
use cxxview_core::memory::{MemorySnapshot, ReadRecorder};
use cxxview_core::types::{Address, ArchitectureProfile, ByteOrder};

/// A target image under construction
pub struct Target
{
    pub arch: ArchitectureProfile,
    pub snapshot: MemorySnapshot,
}

impl Target
{
    pub fn new(arch: ArchitectureProfile) -> Self
    {
        Self {
            arch,
            snapshot: MemorySnapshot::new(arch),
        }
    }

    /// Map raw bytes at `address`
    pub fn bytes(&mut self, address: u64, bytes: &[u8]) -> &mut Self
    {
        self.snapshot.add_region(Address::new(address), bytes.to_vec()).unwrap();
        self
    }

    /// Map consecutive target words (pointers or `size_t`) at `address`
    pub fn words(&mut self, address: u64, words: &[u64]) -> &mut Self
    {
        let mut bytes = Vec::new();
        for &word in words {
            bytes.extend(word_bytes(&self.arch, word));
        }
        self.bytes(address, &bytes)
    }

    /// Map 16-bit code units at `address`
    pub fn units16(&mut self, address: u64, units: &[u16]) -> &mut Self
    {
        let bytes: Vec<u8> = units.iter().flat_map(|unit| unit.to_le_bytes()).collect();
        self.bytes(address, &bytes)
    }

    /// Map 32-bit code units at `address`
    pub fn units32(&mut self, address: u64, units: &[u32]) -> &mut Self
    {
        let bytes: Vec<u8> = units.iter().flat_map(|unit| unit.to_le_bytes()).collect();
        self.bytes(address, &bytes)
    }

    /// Freeze the image behind a read recorder
    pub fn attach(&self) -> Host
    {
        let recorder = Rc::new(ReadRecorder::new(Rc::new(self.snapshot.clone())));
        let context = MemoryContext::new(recorder.clone());
        Host { recorder, context }
    }
}

/// A memory context whose reads are recorded
pub struct Host
{
    pub recorder: Rc<ReadRecorder>,
    pub context: Rc<MemoryContext>,
}

impl Host
{
    pub fn value(&self, name: &str, ty: TypeRef, address: u64) -> ValueRef
    {
        self.context.value(name, ty, Address::new(address))
    }

    /// `(address, len)` of every read so far
    pub fn reads(&self) -> Vec<(u64, usize)>
    {
        self.recorder
            .reads()
            .into_iter()
            .map(|read| (read.address.value(), read.len))
            .collect()
    }
}

pub fn word_bytes(arch: &ArchitectureProfile, word: u64) -> Vec<u8>
{
    let width = arch.pointer_size() as usize;
    match arch.byte_order() {
        ByteOrder::Little => word.to_le_bytes()[..width].to_vec(),
        ByteOrder::Big => word.to_be_bytes()[8 - width..].to_vec(),
    }
}

pub fn primitive(name: &str, arch: &ArchitectureProfile) -> Rc<TypeLayout>
{
    Rc::new(TypeLayout::primitive(name, arch).unwrap())
}
